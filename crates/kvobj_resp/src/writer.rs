//! Token writer.
//!
//! Engine callbacks serialize their replies with [`RespWriter`]; the
//! decoder in `kvobj_core` reads them back without copying.

use crate::{ARRAY_SENTINEL, BULK_SENTINEL, ERROR_SENTINEL, INTEGER_SENTINEL, SIMPLE_SENTINEL};

/// Encode a flat array of length-prefixed tokens.
pub fn encode_array<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let mut writer = RespWriter::new();
    writer.write_array(items);
    writer.into_bytes()
}

/// Encode a scan reply: a two-element wrapper holding the cursor token
/// followed by the array of items.
pub fn encode_scan_reply<T: AsRef<[u8]>>(cursor: &[u8], items: &[T]) -> Vec<u8> {
    let mut writer = RespWriter::new();
    writer.write_array_length(2);
    writer.write_bulk(cursor);
    writer.write_array(items);
    writer.into_bytes()
}

/// Encode an error frame.
pub fn encode_error(message: &str) -> Vec<u8> {
    let mut writer = RespWriter::new();
    writer.write_error(message);
    writer.into_bytes()
}

/// A growable token writer.
#[derive(Debug, Default, Clone)]
pub struct RespWriter {
    buffer: Vec<u8>,
}

impl RespWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Write an array header.
    pub fn write_array_length(&mut self, len: usize) {
        self.write_header(ARRAY_SENTINEL, len.to_string().as_bytes());
    }

    /// Write an array header followed by one token per item.
    pub fn write_array<T: AsRef<[u8]>>(&mut self, items: &[T]) {
        self.write_array_length(items.len());
        for item in items {
            self.write_bulk(item.as_ref());
        }
    }

    /// Write a length-prefixed token.
    pub fn write_bulk(&mut self, bytes: &[u8]) {
        self.write_header(BULK_SENTINEL, bytes.len().to_string().as_bytes());
        self.buffer.extend_from_slice(bytes);
        self.buffer.extend_from_slice(b"\r\n");
    }

    /// Write a null token.
    pub fn write_null_bulk(&mut self) {
        self.write_header(BULK_SENTINEL, b"-1");
    }

    /// Write an error frame.
    pub fn write_error(&mut self, message: &str) {
        self.write_header(ERROR_SENTINEL, message.as_bytes());
    }

    /// Write an integer reply.
    pub fn write_integer(&mut self, value: i64) {
        self.write_header(INTEGER_SENTINEL, value.to_string().as_bytes());
    }

    /// Write a simple string reply.
    pub fn write_simple_string(&mut self, value: &str) {
        self.write_header(SIMPLE_SENTINEL, value.as_bytes());
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume this writer and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    #[inline]
    fn write_header(&mut self, sentinel: u8, body: &[u8]) {
        self.buffer.push(sentinel);
        self.buffer.extend_from_slice(body);
        self.buffer.extend_from_slice(b"\r\n");
    }
}
