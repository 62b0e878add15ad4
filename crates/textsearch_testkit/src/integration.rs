//! Cross-crate integration test helpers.
//!
//! Provides a harness that mirrors every index operation in a plain map and
//! checks the store against it.

use crate::generators::IndexOperation;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use textsearch_core::{EntityId, FieldValue, SearchConfig, TextSearch};
use textsearch_store::{InMemoryStore, IndexStore};

/// A test harness for integration testing.
pub struct SearchHarness {
    /// The search facade.
    pub search: TextSearch<()>,
    /// The store the indexes live in.
    pub store: Arc<InMemoryStore>,
    /// Current value of every indexed (entity, field).
    values: BTreeMap<(EntityId, String), FieldValue>,
}

impl SearchHarness {
    /// Creates a harness over an empty in-memory store.
    pub fn new(config: &SearchConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            search: TextSearch::new(config, Arc::clone(&store)).expect("valid search config"),
            store,
            values: BTreeMap::new(),
        }
    }

    /// Indexes a value and tracks it for later verification.
    pub fn update(&mut self, id: &EntityId, field: &str, value: FieldValue) -> bool {
        let indexed = self
            .search
            .update_indexes(id, field, value.clone())
            .expect("Failed to update indexes");
        self.values.insert((id.clone(), field.to_string()), value);
        indexed
    }

    /// Deletes every index of an entity and updates tracking.
    pub fn delete(&mut self, id: &EntityId) {
        self.search
            .delete_indexes(id, &[])
            .expect("Failed to delete indexes");
        self.values.retain(|(tracked, _), _| tracked != id);
    }

    /// Applies a generated operation.
    pub fn apply(&mut self, op: &IndexOperation) {
        match op {
            IndexOperation::Update { id, field, value } => {
                self.update(id, field, value.clone());
            }
            IndexOperation::Delete { id } => self.delete(id),
        }
    }

    /// Returns the keys `value` should assert in `field`.
    pub fn expected_keys(&self, field: &str, value: &FieldValue) -> Vec<String> {
        self.search
            .indexes()
            .get(field)
            .expect("Field should be indexed")
            .index_keys(value)
    }

    /// Verifies that reverse maps and posting lists match the tracked
    /// values exactly.
    ///
    /// Reverse maps are compared as sets: reordering a value without
    /// changing its keys leaves the stored order untouched.
    pub fn verify_all(&self) {
        let mut expected: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for ((id, field), value) in &self.values {
            let keys: BTreeSet<String> = self.expected_keys(field, value).into_iter().collect();
            let stored: BTreeSet<String> = self
                .search
                .text_indexes_for(id, field)
                .expect("Failed to read reverse map")
                .into_iter()
                .collect();
            assert_eq!(stored, keys, "Reverse map mismatch for {id} {field}");

            for key in keys {
                expected.entry(key).or_default().insert(id.to_string());
            }
        }

        let prefix = format!("{}:text_index:", self.search.indexes().type_prefix());
        let posting_keys = self.store.keys_with_prefix(&prefix);
        assert_eq!(
            posting_keys.len(),
            expected.len(),
            "Unexpected posting lists: {posting_keys:?}"
        );
        for key in posting_keys {
            let members = self.store.set_members(&key).expect("Failed to read posting list");
            assert_eq!(
                Some(&members),
                expected.get(&key),
                "Posting list mismatch for {key}"
            );
        }
    }

    /// Returns the count of tracked (entity, field) values.
    pub fn tracked_count(&self) -> usize {
        self.values.len()
    }
}
