//! Benchmark utilities.

use kvobj_resp::{encode_array, encode_scan_reply};
use rand::Rng;

/// Generate a random token of the specified size.
pub fn random_token(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` random tokens.
pub fn random_tokens(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| random_token(size)).collect()
}

/// Array frame of `count` random tokens.
pub fn array_frame(count: usize, token_size: usize) -> Vec<u8> {
    encode_array(&random_tokens(count, token_size))
}

/// Scan frame with a numeric cursor and `count` random tokens.
pub fn scan_frame(count: usize, token_size: usize) -> Vec<u8> {
    let cursor = rand::thread_rng().gen_range(0u64..1 << 20).to_string();
    encode_scan_reply(cursor.as_bytes(), &random_tokens(count, token_size))
}

/// Array frame of `pairs` field/value pairs.
pub fn pair_frame(pairs: usize, token_size: usize) -> Vec<u8> {
    array_frame(pairs * 2, token_size)
}
