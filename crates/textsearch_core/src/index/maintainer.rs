//! Incremental index maintenance.
//!
//! For every (entity, field) the keys currently asserted are persisted as a
//! reverse map. Updates diff the freshly computed keys against it and only
//! touch posting lists that actually change.
//!
//! # Invariants
//!
//! - After `update` succeeds, the reverse map equals the keys recomputed
//!   from the value just indexed
//! - After `delete` succeeds, the reverse map is absent and the entity is in
//!   none of the posting lists it listed
//! - Unchanged values cause no store writes
//! - All writes for one (entity, field) go out as one batch

use crate::entity::{EntityId, FieldValue};
use crate::error::SearchResult;
use crate::index::field::TextIndexes;
use std::collections::HashSet;
use textsearch_store::{Batch, IndexStore};
use tracing::{debug, trace};

/// Separates keys in a persisted reverse map.
pub const REVERSE_MAP_DELIMITER: char = ';';

/// Key-set difference between what is stored and what should be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDiff {
    /// Keys the entity must be added to.
    pub added: Vec<String>,
    /// Keys the entity must be removed from.
    pub removed: Vec<String>,
}

impl IndexDiff {
    /// Computes `new - old` and `old - new`, keeping each side's order.
    #[must_use]
    pub fn between(old: &[String], new: &[String]) -> Self {
        let old_set: HashSet<&str> = old.iter().map(String::as_str).collect();
        let new_set: HashSet<&str> = new.iter().map(String::as_str).collect();

        Self {
            added: new
                .iter()
                .filter(|k| !old_set.contains(k.as_str()))
                .cloned()
                .collect(),
            removed: old
                .iter()
                .filter(|k| !new_set.contains(k.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Returns true if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Parses a persisted reverse map.
#[must_use]
pub fn parse_reverse_map(raw: &str) -> Vec<String> {
    raw.split(REVERSE_MAP_DELIMITER)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies index updates and deletions for one entity type.
pub struct IndexMaintainer<'a> {
    store: &'a dyn IndexStore,
    indexes: &'a TextIndexes,
}

impl<'a> IndexMaintainer<'a> {
    /// Creates a maintainer writing to `store`.
    pub fn new(store: &'a dyn IndexStore, indexes: &'a TextIndexes) -> Self {
        Self { store, indexes }
    }

    /// Returns the keys currently asserted for `id` in `field`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared fields, or the store error.
    pub fn indexes_for(&self, id: &EntityId, field: &str) -> SearchResult<Vec<String>> {
        let index = self.indexes.get(field)?;
        self.stored_keys(id, index.field())
    }

    fn stored_keys(&self, id: &EntityId, field: &str) -> SearchResult<Vec<String>> {
        let raw = self
            .store
            .get_string(&self.indexes.reverse_map_key(id, field))?;
        Ok(raw.as_deref().map(parse_reverse_map).unwrap_or_default())
    }

    /// Brings the index of `field` for `id` in line with `value`.
    ///
    /// Returns `Ok(false)` when the value yields no index keys at all (every
    /// token is shorter than `minlength` or excluded). Keys asserted by an
    /// earlier value are still withdrawn in that case.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared fields, or the store error.
    pub fn update(&self, id: &EntityId, field: &str, value: &FieldValue) -> SearchResult<bool> {
        let index = self.indexes.get(field)?;
        let new_keys = index.index_keys(value);
        let old_keys = self.stored_keys(id, field)?;
        let diff = IndexDiff::between(&old_keys, &new_keys);

        if diff.is_empty() {
            trace!(entity = %id, field, keys = new_keys.len(), "text index unchanged");
            return Ok(!new_keys.is_empty());
        }

        let mut batch = Batch::new();
        for key in &diff.added {
            batch.set_add(key.as_str(), id.as_str());
        }
        for key in &diff.removed {
            batch.set_remove(key.as_str(), id.as_str());
        }

        let reverse_key = self.indexes.reverse_map_key(id, field);
        if new_keys.is_empty() {
            batch.delete(reverse_key);
        } else {
            batch.set_string(reverse_key, new_keys.join(&REVERSE_MAP_DELIMITER.to_string()));
        }
        self.store.execute(batch)?;

        debug!(
            entity = %id,
            field,
            added = diff.added.len(),
            removed = diff.removed.len(),
            "text index updated"
        );
        Ok(!new_keys.is_empty())
    }

    /// Removes `id` from every posting list of the given fields and drops
    /// their reverse maps. An empty `fields` slice means every indexed field.
    ///
    /// Idempotent: fields without a reverse map cause no writes.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared fields, or the store error.
    pub fn delete(&self, id: &EntityId, fields: &[&str]) -> SearchResult<()> {
        let fields: Vec<&str> = if fields.is_empty() {
            self.indexes.field_names()
        } else {
            for field in fields {
                self.indexes.get(field)?;
            }
            fields.to_vec()
        };

        for field in fields {
            let reverse_key = self.indexes.reverse_map_key(id, field);
            let Some(raw) = self.store.get_string(&reverse_key)? else {
                continue;
            };

            let old_keys = parse_reverse_map(&raw);
            let mut batch = Batch::new();
            for key in &old_keys {
                batch.set_remove(key.as_str(), id.as_str());
            }
            batch.delete(reverse_key);
            self.store.execute(batch)?;

            debug!(entity = %id, field, removed = old_keys.len(), "text index deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexDefinition, SearchConfig};
    use textsearch_store::InMemoryStore;

    fn indexes() -> TextIndexes {
        TextIndexes::compile(
            &SearchConfig::new("Post")
                .index(IndexDefinition::new("title"))
                .index(IndexDefinition::new("tags").exact()),
        )
        .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_between() {
        let diff = IndexDiff::between(&strings(&["a", "b", "c"]), &strings(&["b", "d"]));
        assert_eq!(diff.added, strings(&["d"]));
        assert_eq!(diff.removed, strings(&["a", "c"]));
        assert!(IndexDiff::between(&strings(&["a"]), &strings(&["a"])).is_empty());
    }

    #[test]
    fn parse_reverse_map_skips_empty() {
        assert_eq!(parse_reverse_map("a;b"), strings(&["a", "b"]));
        assert!(parse_reverse_map("").is_empty());
    }

    #[test]
    fn update_writes_posting_lists_and_reverse_map() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        assert!(maintainer.update(&id, "title", &"Some".into()).unwrap());
        // one read plus one batch
        let stats = store.stats();
        assert_eq!(stats.round_trips, 2);
        assert_eq!(stats.set_adds, 3);

        assert!(store.set_members("post:text_index:title:so").unwrap().contains("1"));
        assert!(store.set_members("post:text_index:title:some").unwrap().contains("1"));
        assert_eq!(
            store.get_string("post:1:title_indexes").unwrap().as_deref(),
            Some("post:text_index:title:so;post:text_index:title:som;post:text_index:title:some")
        );
    }

    #[test]
    fn unchanged_value_issues_no_writes() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        maintainer.update(&id, "title", &"Some plain text".into()).unwrap();
        store.reset_stats();

        assert!(maintainer.update(&id, "title", &"Some plain text".into()).unwrap());
        let stats = store.stats();
        assert_eq!(stats.set_mutations(), 0);
        assert_eq!(stats.writes, 0);
        assert_eq!(stats.round_trips, 1);
    }

    #[test]
    fn changed_value_only_touches_the_difference() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        maintainer.update(&id, "title", &"text".into()).unwrap();
        store.reset_stats();

        maintainer.update(&id, "title", &"texts".into()).unwrap();
        let stats = store.stats();
        assert_eq!(stats.set_adds, 1);
        assert_eq!(stats.set_removes, 0);
        assert!(store.set_members("post:text_index:title:texts").unwrap().contains("1"));
    }

    #[test]
    fn too_short_value_returns_false_and_withdraws_old_keys() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        maintainer.update(&id, "title", &"hello".into()).unwrap();
        assert!(!maintainer.update(&id, "title", &"a".into()).unwrap());

        assert!(store.set_members("post:text_index:title:he").unwrap().is_empty());
        assert_eq!(store.get_string("post:1:title_indexes").unwrap(), None);
        assert!(maintainer.indexes_for(&id, "title").unwrap().is_empty());
    }

    #[test]
    fn too_short_value_on_fresh_entity_writes_nothing() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);

        assert!(!maintainer.update(&EntityId::from(9u64), "title", &"x".into()).unwrap());
        assert_eq!(store.stats().writes, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_everything_and_is_idempotent() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        maintainer.update(&id, "title", &"Some plain text".into()).unwrap();
        maintainer.update(&id, "tags", &"personal".into()).unwrap();
        maintainer.delete(&id, &[]).unwrap();

        assert!(store.is_empty());

        store.reset_stats();
        maintainer.delete(&id, &[]).unwrap();
        assert_eq!(store.stats().writes, 0);
        assert_eq!(store.stats().set_mutations(), 0);
    }

    #[test]
    fn delete_selected_field_only() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        maintainer.update(&id, "title", &"plain".into()).unwrap();
        maintainer.update(&id, "tags", &"personal".into()).unwrap();
        maintainer.delete(&id, &["tags"]).unwrap();

        assert!(maintainer.indexes_for(&id, "tags").unwrap().is_empty());
        assert_eq!(maintainer.indexes_for(&id, "title").unwrap().len(), 4);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let store = InMemoryStore::new();
        let indexes = indexes();
        let maintainer = IndexMaintainer::new(&store, &indexes);
        let id = EntityId::from(1u64);

        assert!(maintainer.update(&id, "body", &"text".into()).is_err());
        assert!(maintainer.delete(&id, &["body"]).is_err());
        assert!(maintainer.indexes_for(&id, "body").is_err());
    }
}
