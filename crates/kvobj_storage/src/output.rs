//! Output capsules passed through engine calls.
//!
//! ## Shapes
//!
//! ```text
//! header capsule   Inline { buf: [u8; 4], len: 4 }   small fixed replies
//! footer capsule   Inline { buf: caller buffer, len } array replies that fit
//!                  Rented(RentedBuffer)               array replies that spill
//! ```
//!
//! A capsule starts inline. A callback whose reply does not fit in the
//! inline buffer moves the capsule to the rented shape; the caller's buffer
//! is then no longer referenced. A type-mismatch callback leaves the content
//! length at zero.

use crate::memory::{MemoryPool, RentedBuffer};
use tracing::trace;

/// Size of the fixed output header in bytes.
pub const OBJECT_OUTPUT_HEADER_SIZE: usize = 4;

/// Fixed-size reply written by small-reply callbacks.
///
/// `result` usually carries a count (elements added, removed, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectOutputHeader {
    /// Operation result.
    pub result: i32,
}

impl ObjectOutputHeader {
    /// Creates a header with the given result.
    #[must_use]
    pub const fn new(result: i32) -> Self {
        Self { result }
    }

    /// Little-endian wire form.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; OBJECT_OUTPUT_HEADER_SIZE] {
        self.result.to_le_bytes()
    }

    /// Parses the header from the front of `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; OBJECT_OUTPUT_HEADER_SIZE] =
            bytes.get(..OBJECT_OUTPUT_HEADER_SIZE)?.try_into().ok()?;
        Some(Self::new(i32::from_le_bytes(raw)))
    }

    /// Reads the header out of a capsule; a zero result when the capsule is
    /// shorter than a header.
    #[must_use]
    pub fn from_output(output: &ObjectOutput<'_>) -> Self {
        Self::from_bytes(output.as_bytes()).unwrap_or_default()
    }
}

/// Backing storage of an [`ObjectOutput`].
#[derive(Debug)]
pub enum OutputBuffer<'a> {
    /// Caller-owned bytes; `len` bytes of content.
    Inline {
        /// The caller's buffer.
        buf: &'a mut [u8],
        /// Content length.
        len: usize,
    },
    /// A block rented from a [`MemoryPool`]; returned on drop.
    Rented(RentedBuffer),
}

/// Mutable output target of an engine call.
#[derive(Debug)]
pub struct ObjectOutput<'a> {
    buffer: OutputBuffer<'a>,
}

impl<'a> ObjectOutput<'a> {
    /// An empty footer capsule over a caller buffer.
    #[must_use]
    pub fn inline(buf: &'a mut [u8]) -> Self {
        Self {
            buffer: OutputBuffer::Inline { buf, len: 0 },
        }
    }

    /// A header capsule. The header counts as content until a callback
    /// clears it.
    #[must_use]
    pub fn header(buf: &'a mut [u8; OBJECT_OUTPUT_HEADER_SIZE]) -> Self {
        Self {
            buffer: OutputBuffer::Inline {
                buf,
                len: OBJECT_OUTPUT_HEADER_SIZE,
            },
        }
    }

    /// A capsule over an already rented block.
    #[must_use]
    pub fn rented(block: RentedBuffer) -> Self {
        Self {
            buffer: OutputBuffer::Rented(block),
        }
    }

    /// Returns true while the content lives in the caller's buffer.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.buffer, OutputBuffer::Inline { .. })
    }

    /// Content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.buffer {
            OutputBuffer::Inline { len, .. } => *len,
            OutputBuffer::Rented(block) => block.len(),
        }
    }

    /// Returns true if the capsule holds no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes the capsule can hold without renting.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.buffer {
            OutputBuffer::Inline { buf, .. } => buf.len(),
            OutputBuffer::Rented(block) => block.capacity(),
        }
    }

    /// The content bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buffer {
            OutputBuffer::Inline { buf, len } => &buf[..*len],
            OutputBuffer::Rented(block) => block.as_bytes(),
        }
    }

    /// The backing storage.
    #[must_use]
    pub fn buffer(&self) -> &OutputBuffer<'a> {
        &self.buffer
    }

    /// Replaces the content with `bytes`, renting from `pool` when the
    /// inline buffer is too small.
    pub fn write(&mut self, pool: &MemoryPool, bytes: &[u8]) {
        match &mut self.buffer {
            OutputBuffer::Inline { buf, len } => {
                if bytes.len() <= buf.len() {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    *len = bytes.len();
                    return;
                }
            }
            OutputBuffer::Rented(block) => {
                block.fill(bytes);
                return;
            }
        }

        trace!(len = bytes.len(), "output spills to rented block");
        let mut block = pool.rent(bytes.len());
        block.fill(bytes);
        self.buffer = OutputBuffer::Rented(block);
    }

    /// Writes a fixed header reply.
    pub fn write_header(&mut self, pool: &MemoryPool, header: ObjectOutputHeader) {
        self.write(pool, &header.to_bytes());
    }

    /// Signals that the stored value is not of the expected type.
    pub fn mark_wrong_type(&mut self) {
        match &mut self.buffer {
            OutputBuffer::Inline { len, .. } => *len = 0,
            OutputBuffer::Rented(block) => block.clear(),
        }
    }

    /// Releases the capsule, returning a rented block to its pool.
    pub fn release(self) {
        if let OutputBuffer::Rented(block) = &self.buffer {
            trace!(len = block.len(), "releasing rented output");
        }
    }
}
