//! # textsearch testkit
//!
//! Test utilities for textsearch.
//!
//! This crate provides:
//! - Sample posts, a vector-backed record resolver and a failing store
//! - Property-based test generators using proptest
//! - A harness that checks the store against tracked index state
//!
//! ## Usage
//!
//! ```rust
//! use textsearch_testkit::prelude::*;
//!
//! with_seeded_search(|t| {
//!     let ids = t.matching_ids("technical").unwrap();
//!     assert_eq!(id_strings(&ids), vec!["2", "3"]);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
