//! # KvObj Testkit
//!
//! Test utilities for KvObj.
//!
//! This crate provides:
//! - A scripted engine context and pending resolver
//! - Property-based test generators using proptest
//! - Fuzz targets for the token reader
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kvobj_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_scripted_engine() {
//!     let mut ctx = ScriptedContext::new()
//!         .reply(ScriptedReply::new(EngineStatus::found()).with_header(1));
//!     // ... dispatch against ctx
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
