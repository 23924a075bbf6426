//! Rented output memory.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Default number of returned blocks a pool keeps for reuse.
pub const DEFAULT_RETAIN_LIMIT: usize = 64;

/// Rental counters for a [`MemoryPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Blocks handed out since the pool was created.
    pub rented: u64,
    /// Blocks given back since the pool was created.
    pub returned: u64,
    /// Blocks currently kept on the free list.
    pub retained: usize,
}

impl PoolStats {
    /// Blocks rented and not yet returned.
    #[must_use]
    pub const fn outstanding(&self) -> u64 {
        self.rented - self.returned
    }
}

#[derive(Debug)]
struct PoolShared {
    free: Mutex<Vec<Vec<u8>>>,
    retain_limit: usize,
    rented: AtomicU64,
    returned: AtomicU64,
}

impl PoolShared {
    fn give_back(&self, mut block: Vec<u8>) {
        self.returned.fetch_add(1, Ordering::Relaxed);
        let mut free = self.free.lock();
        if free.len() < self.retain_limit {
            block.clear();
            free.push(block);
        }
    }
}

/// A shared pool of output blocks.
///
/// Engine callbacks rent a block when a reply does not fit in the caller's
/// inline buffer. The block goes back to the pool when its
/// [`RentedBuffer`] is dropped, so every rental is returned exactly once.
///
/// # Thread Safety
///
/// The pool is cheap to clone and can be shared across sessions.
///
/// # Example
///
/// ```rust
/// use kvobj_storage::MemoryPool;
///
/// let pool = MemoryPool::new();
/// let mut block = pool.rent(16);
/// block.fill(b"payload");
/// assert_eq!(block.as_bytes(), b"payload");
/// drop(block);
/// assert_eq!(pool.stats().outstanding(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryPool {
    shared: Arc<PoolShared>,
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::with_retain_limit(DEFAULT_RETAIN_LIMIT)
    }
}

impl MemoryPool {
    /// Creates a pool with the default retain limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool that keeps at most `retain_limit` free blocks.
    #[must_use]
    pub fn with_retain_limit(retain_limit: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                free: Mutex::new(Vec::new()),
                retain_limit,
                rented: AtomicU64::new(0),
                returned: AtomicU64::new(0),
            }),
        }
    }

    /// Rents an empty block with room for at least `min_capacity` bytes.
    #[must_use]
    pub fn rent(&self, min_capacity: usize) -> RentedBuffer {
        let reused = {
            let mut free = self.shared.free.lock();
            let fit = free
                .iter()
                .position(|block| block.capacity() >= min_capacity);
            fit.map(|idx| free.swap_remove(idx))
        };
        let data = reused.unwrap_or_else(|| {
            trace!(min_capacity, "allocating output block");
            Vec::with_capacity(min_capacity)
        });
        self.shared.rented.fetch_add(1, Ordering::Relaxed);
        RentedBuffer {
            data,
            pool: Arc::clone(&self.shared),
        }
    }

    /// Returns the pool's rental counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rented: self.shared.rented.load(Ordering::Relaxed),
            returned: self.shared.returned.load(Ordering::Relaxed),
            retained: self.shared.free.lock().len(),
        }
    }
}

/// An owned block rented from a [`MemoryPool`].
///
/// Dropping the buffer returns it to the pool.
pub struct RentedBuffer {
    data: Vec<u8>,
    pool: Arc<PoolShared>,
}

impl RentedBuffer {
    /// Replaces the content with `bytes`.
    pub fn fill(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
    }

    /// Drops the content, keeping the block.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the block holds no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Block capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The content bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for RentedBuffer {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.data));
    }
}

impl fmt::Debug for RentedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RentedBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}
