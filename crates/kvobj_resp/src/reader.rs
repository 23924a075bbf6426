//! Zero-copy token reader.

use crate::error::{RespError, RespResult};
use crate::{ARRAY_SENTINEL, BULK_SENTINEL, ERROR_SENTINEL};

/// Maximum element count accepted from an array header.
/// Keeps a corrupt header from driving a huge slot allocation.
pub const MAX_ARRAY_LENGTH: usize = 16 * 1024 * 1024;

/// A cursor over a serialized object output.
///
/// Every `read_*` method is all-or-nothing: on error the cursor stays where
/// it was, so callers can decide whether to skip the offending line or give
/// up on the whole frame. Returned slices borrow the underlying buffer.
#[derive(Debug, Clone)]
pub struct RespReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RespReader<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Reads an unsigned array header (`*<n>\r\n`) and returns `n`.
    ///
    /// # Errors
    ///
    /// Fails on a missing `*`, a negative or non-numeric count, a count
    /// above [`MAX_ARRAY_LENGTH`], or a truncated header.
    pub fn read_unsigned_array_length(&mut self) -> RespResult<usize> {
        let mut pos = self.pos;
        self.expect_sentinel(&mut pos, ARRAY_SENTINEL)?;
        let line = self.read_line(&mut pos)?;
        let len = parse_unsigned(line)?;
        if len > MAX_ARRAY_LENGTH {
            return Err(RespError::LengthLimitExceeded {
                claimed: len,
                max_allowed: MAX_ARRAY_LENGTH,
            });
        }
        self.pos = pos;
        Ok(len)
    }

    /// Reads a length-prefixed token (`$<len>\r\n<bytes>\r\n`).
    ///
    /// # Errors
    ///
    /// Fails on a null token (`$-1`) as well as on any malformed header or
    /// truncated payload.
    pub fn read_bulk(&mut self) -> RespResult<&'a [u8]> {
        let (token, pos) = self.bulk_at(self.pos)?;
        let token = token.ok_or_else(|| RespError::invalid_length("null token"))?;
        self.pos = pos;
        Ok(token)
    }

    /// Reads a length-prefixed token that may be null (`$-1\r\n`).
    ///
    /// # Errors
    ///
    /// Fails on a malformed header or truncated payload.
    pub fn read_nullable_bulk(&mut self) -> RespResult<Option<&'a [u8]>> {
        let (token, pos) = self.bulk_at(self.pos)?;
        self.pos = pos;
        Ok(token)
    }

    /// Reads an error frame (`-<message>\r\n`) and returns the message bytes.
    ///
    /// # Errors
    ///
    /// Fails when the frame does not start with `-` or has no terminator.
    pub fn read_error(&mut self) -> RespResult<&'a [u8]> {
        let mut pos = self.pos;
        self.expect_sentinel(&mut pos, ERROR_SENTINEL)?;
        let message = self.read_line(&mut pos)?;
        self.pos = pos;
        Ok(message)
    }

    /// Advances past the next CRLF. Returns false when none is left, in
    /// which case the reader moves to the end of the buffer.
    pub fn skip_line(&mut self) -> bool {
        match find_crlf(self.data, self.pos) {
            Some(cr) => {
                self.pos = cr + 2;
                true
            }
            None => {
                self.pos = self.data.len();
                false
            }
        }
    }

    fn bulk_at(&self, start: usize) -> RespResult<(Option<&'a [u8]>, usize)> {
        let mut pos = start;
        self.expect_sentinel(&mut pos, BULK_SENTINEL)?;
        let header = self.read_line(&mut pos)?;
        if header == b"-1" {
            return Ok((None, pos));
        }
        let len = parse_unsigned(header)?;

        let end = pos.checked_add(len).ok_or(RespError::UnexpectedEof)?;
        let stop = end.checked_add(2).ok_or(RespError::UnexpectedEof)?;
        if stop > self.data.len() {
            return Err(RespError::UnexpectedEof);
        }
        if &self.data[end..stop] != b"\r\n" {
            return Err(RespError::MissingTerminator);
        }
        Ok((Some(&self.data[pos..end]), stop))
    }

    #[inline]
    fn expect_sentinel(&self, pos: &mut usize, sentinel: u8) -> RespResult<()> {
        match self.data.get(*pos) {
            None => Err(RespError::UnexpectedEof),
            Some(&byte) if byte == sentinel => {
                *pos += 1;
                Ok(())
            }
            Some(&byte) => Err(RespError::unexpected_token(sentinel, byte)),
        }
    }

    #[inline]
    fn read_line(&self, pos: &mut usize) -> RespResult<&'a [u8]> {
        let cr = find_crlf(self.data, *pos).ok_or(RespError::UnexpectedEof)?;
        let line = &self.data[*pos..cr];
        *pos = cr + 2;
        Ok(line)
    }
}

fn find_crlf(data: &[u8], from: usize) -> Option<usize> {
    if from >= data.len() {
        return None;
    }
    data[from..]
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|offset| from + offset)
}

fn parse_unsigned(digits: &[u8]) -> RespResult<usize> {
    if digits.is_empty() {
        return Err(RespError::invalid_length("empty length header"));
    }
    let mut value: usize = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(RespError::invalid_length(format!(
                "unexpected byte {:?} in length header",
                char::from(b)
            )));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(b - b'0')))
            .ok_or_else(|| RespError::invalid_length("length header overflow"))?;
    }
    Ok(value)
}
