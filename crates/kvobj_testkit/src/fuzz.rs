//! Fuzz targets for the token reader.
//!
//! Each target accepts arbitrary bytes and must return without panicking.
//! They are driven by proptest here and can be wired into cargo-fuzz.

use kvobj_resp::RespReader;

/// Walks `data` token by token, skipping a line after every failure.
///
/// Returns the number of tokens read.
pub fn fuzz_token_stream(data: &[u8]) -> usize {
    let mut reader = RespReader::new(data);
    let mut tokens = 0;
    while !reader.is_empty() {
        let before = reader.position();
        match reader.read_nullable_bulk() {
            Ok(_) => tokens += 1,
            Err(_) => {
                if !reader.skip_line() {
                    break;
                }
            }
        }
        assert!(reader.position() > before, "reader stalled at {before}");
    }
    tokens
}

/// Reads `data` as an array frame: header, then as many tokens as claimed.
///
/// Returns the claimed count and the tokens actually read, or `None` when
/// the header is unreadable.
pub fn fuzz_array_frame(data: &[u8]) -> Option<(usize, usize)> {
    let mut reader = RespReader::new(data);
    let count = reader.read_unsigned_array_length().ok()?;
    let mut read = 0;
    for _ in 0..count {
        if reader.read_nullable_bulk().is_err() {
            break;
        }
        read += 1;
    }
    assert!(read <= count);
    Some((count, read))
}

/// Reads `data` as an error frame. A decoded message never contains CRLF.
pub fn fuzz_error_frame(data: &[u8]) {
    if let Ok(message) = RespReader::new(data).read_error() {
        assert!(!message.windows(2).any(|w| w == b"\r\n"));
    }
}
