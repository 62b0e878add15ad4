//! The per-entity-type search facade.

use crate::config::SearchConfig;
use crate::entity::{EntityId, FieldValue, Searchable};
use crate::error::{SearchError, SearchResult};
use crate::index::{IndexMaintainer, TextIndexes};
use crate::query::{Matches, Pagination, Query, QueryEngine};
use crate::resolver::{FindOptions, RecordResolver};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use textsearch_store::IndexStore;
use tracing::debug;

/// Options for [`TextSearch::search`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// 1-based page to return. `None` returns every match.
    pub page: Option<usize>,
    /// Page size, falling back to the configured default.
    pub per_page: Option<usize>,
    /// Options forwarded to the record resolver.
    pub find: FindOptions,
}

impl SearchOptions {
    /// Creates options returning every match.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests one page of results.
    #[must_use]
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Overrides the page size.
    #[must_use]
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets the ordering forwarded to the resolver.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.find = self.find.order(order);
        self
    }

    /// Sets the field selection forwarded to the resolver.
    #[must_use]
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.find = self.find.select(fields);
        self
    }

    /// Adds an extra filter forwarded to the resolver.
    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.find = self.find.condition(field, value);
        self
    }

    /// Replaces the forwarded resolver options.
    #[must_use]
    pub fn find(mut self, find: FindOptions) -> Self {
        self.find = find;
        self
    }
}

/// Text search over one entity type.
///
/// Owns the compiled index definitions, the store the indexes live in and,
/// optionally, the resolver that turns matched IDs into records of type `T`.
///
/// # Example
///
/// ```rust
/// use textsearch_core::{IndexDefinition, Query, SearchConfig, TextSearch};
/// use textsearch_store::InMemoryStore;
///
/// let config = SearchConfig::new("Post").index(IndexDefinition::new("title"));
/// let search: TextSearch<()> = TextSearch::new(&config, InMemoryStore::new())?;
///
/// search.update_indexes(&1u64.into(), "title", "Some plain text")?;
/// search.update_indexes(&2u64.into(), "title", "More plain textstring")?;
///
/// assert_eq!(search.matching_ids("plain")?.len(), 2);
/// assert_eq!(search.matching_ids(Query::terms("textstr"))?.len(), 1);
/// # Ok::<(), textsearch_core::SearchError>(())
/// ```
pub struct TextSearch<T> {
    indexes: TextIndexes,
    per_page: usize,
    store: Box<dyn IndexStore>,
    resolver: Option<Box<dyn RecordResolver<Record = T>>>,
}

impl<T> TextSearch<T> {
    /// Validates `config` and creates a facade without a record resolver.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `config` is invalid.
    pub fn new(config: &SearchConfig, store: impl IndexStore + 'static) -> SearchResult<Self> {
        let indexes = TextIndexes::compile(config)?;
        debug!(
            entity_type = indexes.entity_type(),
            prefix = indexes.type_prefix(),
            fields = indexes.field_names().len(),
            "text search configured"
        );
        Ok(Self {
            indexes,
            per_page: config.default_per_page(),
            store: Box::new(store),
            resolver: None,
        })
    }

    /// Sets the resolver used by [`TextSearch::search`].
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl RecordResolver<Record = T> + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Returns the compiled indexes.
    #[must_use]
    pub fn indexes(&self) -> &TextIndexes {
        &self.indexes
    }

    /// Returns the default page size.
    #[must_use]
    pub fn default_per_page(&self) -> usize {
        self.per_page
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn IndexStore {
        self.store.as_ref()
    }

    fn maintainer(&self) -> IndexMaintainer<'_> {
        IndexMaintainer::new(self.store.as_ref(), &self.indexes)
    }

    /// Indexes `value` as the current content of `field` for `id`.
    ///
    /// Returns `Ok(false)` if the value yields nothing to index.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared fields, or the store error.
    pub fn update_indexes(
        &self,
        id: &EntityId,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> SearchResult<bool> {
        self.maintainer().update(id, field, &value.into())
    }

    /// Indexes several fields of `id` at once.
    ///
    /// Returns how many of the fields produced index keys.
    ///
    /// # Errors
    ///
    /// Stops at the first unknown field or store error. Fields before it are
    /// already indexed.
    pub fn update_indexes_for<I, F, V>(&self, id: &EntityId, values: I) -> SearchResult<usize>
    where
        I: IntoIterator<Item = (F, V)>,
        F: AsRef<str>,
        V: Into<FieldValue>,
    {
        let maintainer = self.maintainer();
        let mut indexed = 0;
        for (field, value) in values {
            if maintainer.update(id, field.as_ref(), &value.into())? {
                indexed += 1;
            }
        }
        Ok(indexed)
    }

    /// Indexes every declared field of `entity`. Missing values are indexed
    /// as empty, withdrawing whatever was indexed before.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub fn update_entity(&self, entity: &impl Searchable) -> SearchResult<usize> {
        let id = entity.search_id();
        let values = self.indexes.field_names().into_iter().map(|field| {
            let value = entity.field_value(field).unwrap_or_else(FieldValue::empty);
            (field, value)
        });
        self.update_indexes_for(&id, values)
    }

    /// Removes `id` from the indexes of `fields`, or of every field if
    /// `fields` is empty.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared fields, or the store error.
    pub fn delete_indexes(&self, id: &EntityId, fields: &[&str]) -> SearchResult<()> {
        self.maintainer().delete(id, fields)
    }

    /// Removes `entity` from every index.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub fn delete_entity(&self, entity: &impl Searchable) -> SearchResult<()> {
        self.delete_indexes(&entity.search_id(), &[])
    }

    /// Returns the index keys currently asserted for `id` in `field`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for undeclared fields, or the store error.
    pub fn text_indexes_for(&self, id: &EntityId, field: &str) -> SearchResult<Vec<String>> {
        self.maintainer().indexes_for(id, field)
    }

    /// Returns the index keys asserted for `id` across all fields, in field
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub fn text_indexes(&self, id: &EntityId) -> SearchResult<Vec<String>> {
        let maintainer = self.maintainer();
        let mut keys = Vec::new();
        for field in self.indexes.field_names() {
            keys.extend(maintainer.indexes_for(id, field)?);
        }
        Ok(keys)
    }

    /// Returns the IDs of every entity matching `query`, without resolving
    /// records.
    ///
    /// # Errors
    ///
    /// Returns `BadQuery`, `UnknownField`, or the store error.
    pub fn matching_ids(&self, query: impl Into<Query>) -> SearchResult<BTreeSet<EntityId>> {
        QueryEngine::new(self.store.as_ref(), &self.indexes).resolve(&query.into())
    }

    /// Resolves `query` into records, one page at a time if
    /// `options.page` is set.
    ///
    /// The resolver is not called when nothing matches. With extra
    /// conditions in `options.find` the page total comes from the
    /// resolver's `count`, otherwise from the number of matched IDs.
    ///
    /// # Errors
    ///
    /// - `Configuration` if no resolver is set, or if conditions require a
    ///   count the resolver cannot provide
    /// - `BadQuery` / `UnknownField` for malformed requests
    /// - the store or resolver error
    pub fn search(&self, query: impl Into<Query>, options: SearchOptions) -> SearchResult<Matches<T>> {
        let resolver = self.resolver.as_deref().ok_or_else(|| {
            SearchError::configuration(format!(
                "no record resolver configured for {}",
                self.indexes.entity_type()
            ))
        })?;

        let ids: Vec<EntityId> = self.matching_ids(query)?.into_iter().collect();

        let SearchOptions {
            page,
            per_page,
            mut find,
        } = options;
        let pagination = page.map(|page| Pagination::new(page, per_page.unwrap_or(self.per_page)));
        if let Some(p) = &pagination {
            find.offset = Some(p.offset);
            find.limit = Some(p.limit);
        }

        if ids.is_empty() {
            debug!(entity_type = self.indexes.entity_type(), "search matched nothing");
            return Ok(match pagination {
                Some(p) => Matches::page(Vec::new(), p.with_total(0)),
                None => Matches::all(Vec::new()),
            });
        }

        let Some(pagination) = pagination else {
            let records = resolver.find(&ids, &find).map_err(SearchError::Resolver)?;
            debug!(
                entity_type = self.indexes.entity_type(),
                matches = ids.len(),
                records = records.len(),
                "search resolved"
            );
            return Ok(Matches::all(records));
        };

        let total = if find.has_conditions() {
            resolver
                .count(&ids, &find.for_count())
                .map_err(SearchError::Resolver)?
                .ok_or_else(|| {
                    SearchError::configuration(format!(
                        "record resolver for {} cannot count filtered matches",
                        self.indexes.entity_type()
                    ))
                })?
        } else {
            ids.len()
        };
        let records = resolver.find(&ids, &find).map_err(SearchError::Resolver)?;

        debug!(
            entity_type = self.indexes.entity_type(),
            page = pagination.page,
            offset = pagination.offset,
            limit = pagination.limit,
            total,
            "search page resolved"
        );
        Ok(Matches::page(records, pagination.with_total(total)))
    }
}

impl<T> fmt::Debug for TextSearch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSearch")
            .field("entity_type", &self.indexes.entity_type())
            .field("fields", &self.indexes.field_names())
            .field("per_page", &self.per_page)
            .field("resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}
