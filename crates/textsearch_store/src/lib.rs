//! # textsearch store
//!
//! Index store trait and implementations for textsearch.
//!
//! This crate provides the lowest-level storage abstraction for the text
//! search engine. Stores are **remote key-value set stores** in the style of
//! Redis: every key holds either a set of string members (a posting list) or
//! a plain string (a reverse map). Stores do not interpret keys or values.
//!
//! ## Design Principles
//!
//! - Stores expose set primitives (add, remove, members, intersect, union)
//!   and string primitives (get, set, delete)
//! - Mutations can be grouped into a [`Batch`] and applied in one round trip
//! - Must be `Send + Sync` so one store can serve many engines
//! - No retries, timeouts or transactions at this layer
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and single-process deployments
//!
//! ## Example
//!
//! ```rust
//! use textsearch_store::{Batch, IndexStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! let mut batch = Batch::new();
//! batch.set_add("post:text_index:title:so", "1");
//! batch.set_add("post:text_index:title:som", "1");
//! store.execute(batch).unwrap();
//!
//! let members = store.set_members("post:text_index:title:so").unwrap();
//! assert!(members.contains("1"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod error;
mod memory;
mod store;

pub use batch::{Batch, StoreOp};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, StoreStats};
pub use store::{IndexStore, MemberSet};
