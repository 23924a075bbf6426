//! # KvObj Core
//!
//! Bridge between the command layer and the object store.
//!
//! This crate provides:
//! - [`StorageSession`], which dispatches read and read-modify-write
//!   operations to the engine and completes pending ones
//! - [`translate`], which maps engine outcomes to [`ObjectStatus`]
//! - Zero-copy decoders for serialized array, pair and single-token replies
//!
//! ## Example
//!
//! ```rust
//! use kvobj_core::{process_resp_array_output, FooterBuffer};
//! use kvobj_storage::MemoryPool;
//!
//! let pool = MemoryPool::new();
//! let mut footer = FooterBuffer::with_capacity(64);
//! let mut output = footer.output();
//! output.write(&pool, b"*2\r\n$1\r\na\r\n$1\r\nb\r\n");
//!
//! let count = process_resp_array_output(output, false, |decoded| decoded.len());
//! assert_eq!(count, 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod output;
mod session;
mod status;

pub use config::SessionConfig;
pub use error::{CoreError, CoreResult};
pub use output::{
    process_resp_array_output, process_resp_array_output_as_pairs,
    process_resp_single_token_output, ArrayOutput, FooterBuffer, PairOutput,
};
pub use session::StorageSession;
pub use status::{translate, ObjectStatus, OperationPath};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
