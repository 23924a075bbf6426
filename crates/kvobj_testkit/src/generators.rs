//! Property-based test generators using proptest.
//!
//! Tokens are arbitrary bytes, CRLF included: length-prefixed tokens carry
//! them verbatim. Error messages and cursors stay on one line.

use kvobj_resp::encode_array;
use kvobj_storage::{EngineStatus, RecordFlags};
use proptest::prelude::*;

/// Longest token the generators produce.
pub const MAX_TOKEN_LEN: usize = 48;

/// Strategy for a single token payload.
pub fn token_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..MAX_TOKEN_LEN)
}

/// Strategy for up to `max` tokens.
pub fn token_list_strategy(max: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(token_strategy(), 0..=max)
}

/// Strategy for up to `max` field/value pairs.
pub fn pair_list_strategy(max: usize) -> impl Strategy<Value = Vec<(Vec<u8>, Vec<u8>)>> {
    prop::collection::vec((token_strategy(), token_strategy()), 0..=max)
}

/// Strategy for a scan cursor.
pub fn cursor_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::string::string_regex("[0-9]{1,8}")
        .expect("Invalid regex")
        .prop_map(String::into_bytes)
}

/// Strategy for a one-line error message.
pub fn error_message_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 _-]{0,40}").expect("Invalid regex")
}

/// Strategy for tokens together with their encoded array frame.
pub fn array_frame_strategy(max: usize) -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<u8>)> {
    token_list_strategy(max).prop_map(|tokens| {
        let frame = encode_array(&tokens);
        (tokens, frame)
    })
}

/// Strategy for frames that are mostly malformed.
///
/// Mixes raw bytes, headers carrying any `u64` length, and valid array
/// frames cut short or with one byte flipped.
pub fn malformed_frame_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..256),
        (
            prop::sample::select(vec![b'$', b'*', b'-', b':']),
            any::<u64>(),
            prop::collection::vec(any::<u8>(), 0..64),
        )
            .prop_map(|(sentinel, len, tail)| {
                let mut frame = vec![sentinel];
                frame.extend_from_slice(format!("{len}\r\n").as_bytes());
                frame.extend_from_slice(&tail);
                frame
            }),
        (array_frame_strategy(8), any::<prop::sample::Index>()).prop_map(
            |((_, mut frame), cut)| {
                frame.truncate(cut.index(frame.len() + 1));
                frame
            }
        ),
        (
            array_frame_strategy(8),
            any::<prop::sample::Index>(),
            any::<u8>(),
        )
            .prop_map(|((_, mut frame), at, byte)| {
                let at = at.index(frame.len());
                frame[at] = byte;
                frame
            }),
    ]
}

/// Strategy for record flags.
pub fn record_flags_strategy() -> impl Strategy<Value = RecordFlags> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(created, copy_updated, in_place_updated)| RecordFlags {
            created,
            copy_updated,
            in_place_updated,
        },
    )
}

/// Strategy for a terminal (never pending) engine outcome.
pub fn terminal_status_strategy() -> impl Strategy<Value = EngineStatus> {
    (any::<bool>(), record_flags_strategy()).prop_map(|(found, record)| {
        let base = if found {
            EngineStatus::found()
        } else {
            EngineStatus::not_found()
        };
        base.with_record(record)
    })
}
