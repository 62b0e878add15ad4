//! Property-based test generators using proptest.
//!
//! Provides strategies for field values, index definitions and sequences of
//! index operations.

use proptest::prelude::*;
use textsearch_core::{EntityId, FieldValue, IndexDefinition};

/// Strategy for generating lowercase words.
pub fn word_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex")
}

/// Strategy for generating raw tokens with mixed case and punctuation.
pub fn raw_token_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9!',.]{1,10}").expect("Invalid regex")
}

/// Strategy for generating free text of up to `max_words` raw tokens.
pub fn text_strategy(max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(raw_token_strategy(), 0..=max_words).prop_map(|words| words.join(" "))
}

/// Strategy for generating field values, text or phrase lists.
pub fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        3 => text_strategy(6).prop_map(FieldValue::Text),
        1 => prop::collection::vec(word_strategy(), 0..4).prop_map(FieldValue::Phrases),
    ]
}

/// Strategy for generating entity IDs from a small pool, so operations
/// collide on the same entities.
pub fn entity_id_strategy() -> impl Strategy<Value = EntityId> {
    (1u64..=8).prop_map(EntityId::from)
}

/// Strategy for generating index definitions for `field`.
pub fn index_definition_strategy(field: &'static str) -> impl Strategy<Value = IndexDefinition> {
    (1usize..=3, any::<bool>(), any::<bool>()).prop_map(move |(minlength, exact, full)| {
        let mut def = IndexDefinition::new(field).minlength(minlength);
        if exact {
            def = def.exact();
        }
        if full {
            def = def.full();
        }
        def
    })
}

/// An operation against a post search.
#[derive(Debug, Clone)]
pub enum IndexOperation {
    /// Index a field value
    Update {
        /// Entity ID
        id: EntityId,
        /// Field name
        field: &'static str,
        /// New value
        value: FieldValue,
    },
    /// Delete every index of an entity
    Delete {
        /// Entity ID
        id: EntityId,
    },
}

/// Strategy for generating operations on the `title` and `tags` fields.
pub fn index_operation_strategy() -> impl Strategy<Value = IndexOperation> {
    prop_oneof![
        4 => (entity_id_strategy(), prop::sample::select(vec!["title", "tags"]), field_value_strategy())
            .prop_map(|(id, field, value)| IndexOperation::Update { id, field, value }),
        1 => entity_id_strategy().prop_map(|id| IndexOperation::Delete { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<IndexOperation>> {
    prop::collection::vec(index_operation_strategy(), min_ops..max_ops)
}

/// Case count for suites that replay index operations against a fresh
/// store per case.
pub const QUICK_CASES: u32 = 32;

/// Returns the proptest configuration shared by the index suites.
#[must_use]
pub fn quick_config() -> ProptestConfig {
    ProptestConfig::with_cases(QUICK_CASES)
}
