//! Error types for the token crate.

use thiserror::Error;

/// Result type for token operations.
pub type RespResult<T> = Result<T, RespError>;

/// Errors that can occur while reading a serialized object output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RespError {
    /// The buffer ended before the token was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A token started with the wrong sentinel byte.
    #[error("unexpected token: expected {expected:?}, found {found:?}")]
    UnexpectedToken {
        /// The sentinel byte the reader was looking for.
        expected: char,
        /// The byte that was actually present.
        found: char,
    },

    /// A length or integer header could not be parsed.
    #[error("invalid length header: {message}")]
    InvalidLength {
        /// Description of the parse failure.
        message: String,
    },

    /// A header or payload was not followed by CRLF.
    #[error("missing CRLF terminator")]
    MissingTerminator,

    /// An array header claimed more elements than the reader accepts.
    #[error("array length {claimed} exceeds limit {max_allowed}")]
    LengthLimitExceeded {
        /// Element count claimed by the header.
        claimed: usize,
        /// Maximum element count accepted.
        max_allowed: usize,
    },
}

impl RespError {
    /// Create an invalid length error.
    pub fn invalid_length(message: impl Into<String>) -> Self {
        Self::InvalidLength {
            message: message.into(),
        }
    }

    /// Create an unexpected token error from raw bytes.
    pub fn unexpected_token(expected: u8, found: u8) -> Self {
        Self::UnexpectedToken {
            expected: char::from(expected),
            found: char::from(found),
        }
    }
}
