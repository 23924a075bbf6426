//! Benchmark support for KvObj.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
