//! # KvObj Token Format
//!
//! Reader and writer for the length-prefixed output format produced by
//! object-store callbacks.
//!
//! The format is a subset of RESP:
//! - `-<message>\r\n` is an error frame
//! - `*<n>\r\n` is an array header followed by `n` tokens
//! - `$<len>\r\n<bytes>\r\n` is a length-prefixed token (`$-1\r\n` is null)
//!
//! The reader never copies: every token comes back as a slice of the input
//! buffer. Buffers are produced internally, so the reader is strict about
//! framing but callers may choose to fail soft.
//!
//! ## Usage
//!
//! ```
//! use kvobj_resp::{encode_array, RespReader};
//!
//! let frame = encode_array(&["a", "b"]);
//! let mut reader = RespReader::new(&frame);
//! assert_eq!(reader.read_unsigned_array_length().unwrap(), 2);
//! assert_eq!(reader.read_bulk().unwrap(), b"a");
//! assert_eq!(reader.read_bulk().unwrap(), b"b");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod reader;
mod writer;

pub use error::{RespError, RespResult};
pub use reader::{RespReader, MAX_ARRAY_LENGTH};
pub use writer::{encode_array, encode_error, encode_scan_reply, RespWriter};

/// Leading byte of an error frame.
pub const ERROR_SENTINEL: u8 = b'-';
/// Leading byte of an array header.
pub const ARRAY_SENTINEL: u8 = b'*';
/// Leading byte of a length-prefixed token.
pub const BULK_SENTINEL: u8 = b'$';
/// Leading byte of an integer reply.
pub const INTEGER_SENTINEL: u8 = b':';
/// Leading byte of a simple string reply.
pub const SIMPLE_SENTINEL: u8 = b'+';
