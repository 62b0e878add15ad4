//! Text index construction and maintenance.
//!
//! A value travels through three stages before it reaches the store:
//!
//! - [`Tokenizer`]: splits and normalizes it into tokens
//! - [`PrefixExpander`]: turns tokens into prefix (or exact) index keys
//! - [`IndexMaintainer`]: diffs the keys against the reverse map and writes
//!   only the difference

mod expander;
mod field;
mod maintainer;
mod tokenizer;

pub use expander::{join_whitespace, PrefixExpander, KEY_JOINER};
pub use field::{FieldIndex, TextIndexes};
pub use maintainer::{parse_reverse_map, IndexDiff, IndexMaintainer, REVERSE_MAP_DELIMITER};
pub use tokenizer::{normalize, Tokenizer, Tokens};
