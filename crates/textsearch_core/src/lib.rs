//! # textsearch core
//!
//! Substring/prefix text search over an inverted index kept in a
//! [`textsearch_store::IndexStore`].
//!
//! This crate provides:
//! - Tokenizing and normalizing field values
//! - Prefix expansion of tokens into index keys (prefix, exact and full modes)
//! - Incremental index maintenance that only writes what changed
//! - A query engine for map-form and positional-form searches
//! - Pagination and a [`RecordResolver`] seam for loading records
//!
//! ## Example
//!
//! ```rust
//! use textsearch_core::{IndexDefinition, Query, SearchConfig, TextSearch};
//! use textsearch_store::InMemoryStore;
//!
//! let config = SearchConfig::new("Post")
//!     .index(IndexDefinition::new("title"))
//!     .index(IndexDefinition::new("tags").exact());
//! let search: TextSearch<()> = TextSearch::new(&config, InMemoryStore::new())?;
//!
//! search.update_indexes(&1u64.into(), "title", "Some plain text")?;
//! search.update_indexes(&1u64.into(), "tags", "personal nontechnical")?;
//! search.update_indexes(&2u64.into(), "title", "More plain textstring comments")?;
//! search.update_indexes(&2u64.into(), "tags", vec!["mysql", "technical"])?;
//!
//! // positional form: every value within one field, any field
//! assert_eq!(search.matching_ids(Query::terms(["plain", "text"]))?.len(), 2);
//!
//! // map form: any value within a field, every field
//! let q = Query::fields().field("tags", ["technical", "mysql"]).field("title", "mo");
//! assert_eq!(search.matching_ids(q)?.len(), 1);
//! # Ok::<(), textsearch_core::SearchError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entity;
mod error;
pub mod index;
pub mod query;
mod resolver;
mod search;

pub use config::{
    derive_type_prefix, IndexDefinition, SearchConfig, SplitRule, DEFAULT_EXCLUDE_LIST,
    DEFAULT_MIN_LENGTH, DEFAULT_PER_PAGE,
};
pub use entity::{EntityId, FieldValue, Searchable};
pub use error::{ResolverError, SearchError, SearchResult};
pub use index::{normalize, FieldIndex, TextIndexes};
pub use query::{FieldsQuery, Matches, Pagination, Query, TermsQuery, Values};
pub use resolver::{FindOptions, RecordResolver};
pub use search::{SearchOptions, TextSearch};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
