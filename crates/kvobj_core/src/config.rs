//! Session configuration.

use crate::error::{CoreError, CoreResult};
use kvobj_storage::{MemoryPool, DEFAULT_RETAIN_LIMIT};

/// Configuration for a [`crate::StorageSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Size of the inline footer buffer handed to array-returning commands.
    /// Replies larger than this spill into rented memory.
    pub footer_capacity: usize,

    /// Number of returned blocks a pool built from this config keeps.
    pub pool_retain_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            footer_capacity: 512,
            pool_retain_limit: DEFAULT_RETAIN_LIMIT,
        }
    }
}

impl SessionConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inline footer capacity.
    #[must_use]
    pub const fn footer_capacity(mut self, bytes: usize) -> Self {
        self.footer_capacity = bytes;
        self
    }

    /// Sets how many free blocks a pool keeps.
    #[must_use]
    pub const fn pool_retain_limit(mut self, blocks: usize) -> Self {
        self.pool_retain_limit = blocks;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when the footer capacity is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.footer_capacity == 0 {
            return Err(CoreError::invalid_config(
                "footer capacity must be non-zero",
            ));
        }
        Ok(())
    }

    /// Builds a memory pool for engine callbacks.
    #[must_use]
    pub fn memory_pool(&self) -> MemoryPool {
        MemoryPool::with_retain_limit(self.pool_retain_limit)
    }
}
