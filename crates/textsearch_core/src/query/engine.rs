//! Resolution of search requests into entity ID sets.

use crate::entity::EntityId;
use crate::error::{SearchError, SearchResult};
use crate::index::TextIndexes;
use crate::query::{FieldsQuery, Query, TermsQuery};
use std::collections::BTreeSet;
use textsearch_store::{IndexStore, MemberSet};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Combine {
    Union,
    Intersect,
}

/// Turns [`Query`] values into set operations over posting lists.
pub struct QueryEngine<'a> {
    store: &'a dyn IndexStore,
    indexes: &'a TextIndexes,
}

impl<'a> QueryEngine<'a> {
    /// Creates an engine reading from `store`.
    pub fn new(store: &'a dyn IndexStore, indexes: &'a TextIndexes) -> Self {
        Self { store, indexes }
    }

    /// Returns the IDs of every entity matching `query`.
    ///
    /// # Errors
    ///
    /// - `BadQuery` if the request carries no search values
    /// - `UnknownField` if it names a field without a text index
    /// - the store error if a lookup fails
    pub fn resolve(&self, query: &Query) -> SearchResult<BTreeSet<EntityId>> {
        let members = match query {
            Query::Fields(q) => self.resolve_fields(q)?,
            Query::Terms(q) => self.resolve_terms(q)?,
        };
        Ok(members.into_iter().map(EntityId::from).collect())
    }

    fn resolve_fields(&self, query: &FieldsQuery) -> SearchResult<MemberSet> {
        let entries = query.entries();
        if entries.is_empty() || entries.iter().any(|(_, values)| values.is_empty()) {
            return Err(SearchError::bad_query("search requires at least one value per field"));
        }

        let mut keys_per_field = Vec::with_capacity(entries.len());
        for (field, values) in entries {
            let index = self.indexes.get(field)?;
            let keys: Vec<String> = values.as_slice().iter().map(|v| index.query_key(v)).collect();
            keys_per_field.push(keys);
        }

        let mut result: Option<MemberSet> = None;
        for keys in &keys_per_field {
            let ids = self.lookup(keys, Combine::Union)?;
            let next = match result {
                None => ids,
                Some(acc) => acc.intersection(&ids).cloned().collect(),
            };
            if next.is_empty() {
                debug!(fields = entries.len(), "field search short-circuited on empty set");
                return Ok(next);
            }
            result = Some(next);
        }

        let result = result.unwrap_or_default();
        debug!(fields = entries.len(), matches = result.len(), "field search resolved");
        Ok(result)
    }

    fn resolve_terms(&self, query: &TermsQuery) -> SearchResult<MemberSet> {
        let values = query.values();
        if values.is_empty() {
            return Err(SearchError::bad_query("search requires at least one value"));
        }

        let indexes = match query.fields() {
            Some(fields) => fields
                .iter()
                .map(|f| self.indexes.get(f))
                .collect::<SearchResult<Vec<_>>>()?,
            None => self.indexes.iter().collect(),
        };

        let mut result = MemberSet::new();
        for index in &indexes {
            let keys: Vec<String> = values.iter().map(|v| index.query_key(v)).collect();
            result.extend(self.lookup(&keys, Combine::Intersect)?);
        }

        debug!(
            values = values.len(),
            fields = indexes.len(),
            matches = result.len(),
            "term search resolved"
        );
        Ok(result)
    }

    fn lookup(&self, keys: &[String], combine: Combine) -> SearchResult<MemberSet> {
        let members = match (keys, combine) {
            ([key], _) => self.store.set_members(key)?,
            (_, Combine::Union) => self.store.set_union(keys)?,
            (_, Combine::Intersect) => self.store.set_intersect(keys)?,
        };
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexDefinition, SearchConfig};
    use crate::entity::FieldValue;
    use crate::index::IndexMaintainer;
    use textsearch_store::InMemoryStore;

    fn setup() -> (InMemoryStore, TextIndexes) {
        let indexes = TextIndexes::compile(
            &SearchConfig::new("Post")
                .index(IndexDefinition::new("title"))
                .index(IndexDefinition::new("tags").exact()),
        )
        .unwrap();
        let store = InMemoryStore::new();
        {
            let maintainer = IndexMaintainer::new(&store, &indexes);
            let docs: [(u64, &str, FieldValue); 3] = [
                (1, "Some plain text", "personal nontechnical".into()),
                (2, "More plain textstring comments", ["mysql", "technical"].into()),
                (3, "Come get somebody personal comments", "gaming technical".into()),
            ];
            for (id, title, tags) in docs {
                let id = EntityId::from(id);
                maintainer.update(&id, "title", &title.into()).unwrap();
                maintainer.update(&id, "tags", &tags).unwrap();
            }
        }
        (store, indexes)
    }

    fn ids(set: BTreeSet<EntityId>) -> Vec<String> {
        set.into_iter().map(EntityId::into_string).collect()
    }

    #[test]
    fn terms_across_all_fields() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        assert_eq!(ids(engine.resolve(&"some".into()).unwrap()), vec!["1", "3"]);
        assert_eq!(ids(engine.resolve(&"personal".into()).unwrap()), vec!["1", "3"]);
        assert_eq!(ids(engine.resolve(&"techNIcal".into()).unwrap()), vec!["2", "3"]);
    }

    #[test]
    fn terms_intersect_within_field() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        let q: Query = Query::terms(["plain", "textstr"]).into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["2"]);

        let q: Query = Query::terms(["some", "TExt"]).into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["1"]);
    }

    #[test]
    fn terms_restricted_to_fields() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        let q: Query = Query::terms("PERsonal").in_fields(["tags"]).into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["1"]);

        let q: Query = Query::terms("nontechnical").in_fields(["title"]).into();
        assert!(engine.resolve(&q).unwrap().is_empty());
    }

    #[test]
    fn fields_union_values_and_intersect_fields() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        let q: Query = Query::fields().field("tags", "technical").field("title", "plain").into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["2"]);

        let q: Query = Query::fields()
            .field("tags", ["technical", "MYsql"])
            .field("title", "Mo")
            .into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["2"]);

        let q: Query = Query::fields()
            .field("tags", ["technical", "MYsql"])
            .field("title", "some")
            .into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["3"]);

        let q: Query = Query::fields().field("tags", "technical").field("title", "comments").into();
        assert_eq!(ids(engine.resolve(&q).unwrap()), vec!["2", "3"]);
    }

    #[test]
    fn exact_field_does_not_match_prefixes() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        let q: Query = Query::fields().field("tags", "pers").into();
        assert!(engine.resolve(&q).unwrap().is_empty());
    }

    #[test]
    fn empty_requests_are_bad_queries() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        let empty: Vec<&str> = Vec::new();
        let queries: [Query; 3] = [
            Query::terms(empty.clone()).into(),
            Query::fields().into(),
            Query::fields().field("tags", empty).into(),
        ];
        for q in queries {
            assert!(matches!(engine.resolve(&q), Err(SearchError::BadQuery { .. })));
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);

        let q: Query = Query::fields().field("body", "x").into();
        assert!(matches!(engine.resolve(&q), Err(SearchError::UnknownField { .. })));

        let q: Query = Query::terms("x").in_fields(["body"]).into();
        assert!(matches!(engine.resolve(&q), Err(SearchError::UnknownField { .. })));
    }

    #[test]
    fn single_key_uses_plain_membership() {
        let (store, indexes) = setup();
        let engine = QueryEngine::new(&store, &indexes);
        store.reset_stats();

        let q: Query = Query::terms("plain").in_fields(["title"]).into();
        engine.resolve(&q).unwrap();
        assert_eq!(store.stats().round_trips, 1);
    }
}
