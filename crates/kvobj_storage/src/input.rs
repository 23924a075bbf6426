//! Borrowed operation input.

use std::fmt;

/// A borrowed view of a command's operation payload.
///
/// The command parser owns the bytes; the view never outlives the call it
/// was produced for and is never mutated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ArgSlice<'a>(&'a [u8]);

impl<'a> ArgSlice<'a> {
    /// Wraps a byte slice.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    /// The viewed bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the view is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<&'a [u8]> for ArgSlice<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ArgSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgSlice({:?})", String::from_utf8_lossy(self.0))
    }
}
