//! # KvObj Storage
//!
//! Engine-facing interface for the KvObj object-store bridge.
//!
//! This crate describes the boundary with the transactional key-value
//! engine. It does not implement an engine: indexing, the log and
//! checkpointing live behind [`ObjectContext`].
//!
//! ## Contents
//!
//! - [`ObjectContext`] / [`PendingResolver`] - what an engine binding provides
//! - [`EngineStatus`] - outcome of an engine call
//! - [`ObjectOutput`] - output capsule, inline or rented
//! - [`MemoryPool`] - source of rented output blocks
//!
//! ## Example
//!
//! ```rust
//! use kvobj_storage::{MemoryPool, ObjectOutput};
//!
//! let pool = MemoryPool::new();
//! let mut footer = [0u8; 8];
//! let mut output = ObjectOutput::inline(&mut footer);
//! output.write(&pool, b"does not fit inline");
//! assert!(!output.is_inline());
//! output.release();
//! assert_eq!(pool.stats().outstanding(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod input;
mod memory;
mod output;
mod status;

pub use context::{ObjectContext, PendingResolver};
pub use input::ArgSlice;
pub use memory::{MemoryPool, PoolStats, RentedBuffer, DEFAULT_RETAIN_LIMIT};
pub use output::{ObjectOutput, ObjectOutputHeader, OutputBuffer, OBJECT_OUTPUT_HEADER_SIZE};
pub use status::{EngineStatus, RecordFlags};
