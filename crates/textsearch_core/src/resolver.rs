//! Record resolution seam.
//!
//! The engine only knows entity IDs. Turning them into domain records is the
//! job of a [`RecordResolver`] supplied by the host application, typically a
//! thin wrapper over its database layer.

use crate::entity::EntityId;
use crate::error::ResolverError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Options passed through to the resolver unchanged, except for
/// `offset`/`limit` which pagination fills in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Ordering clause, e.g. `"updated_at desc"`.
    pub order: Option<String>,
    /// Columns or fields to load.
    pub select: Option<Vec<String>>,
    /// Extra equality filters applied on top of the ID filter.
    pub conditions: BTreeMap<String, Value>,
    /// Records to skip.
    pub offset: Option<usize>,
    /// Maximum records to return.
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ordering clause.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets the fields to load.
    #[must_use]
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// Returns true if filters beyond the ID list are present.
    #[must_use]
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Returns the subset of options relevant for counting matches.
    #[must_use]
    pub fn for_count(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            ..Self::default()
        }
    }
}

/// Loads domain records for matched entity IDs.
pub trait RecordResolver: Send + Sync {
    /// The domain record type.
    type Record;

    /// Returns the records whose IDs are in `ids`, honoring `options`.
    ///
    /// Only called with a non-empty `ids`. Implementations must apply the ID
    /// filter together with any `options.conditions`, never instead of them.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying data source.
    fn find(&self, ids: &[EntityId], options: &FindOptions)
        -> Result<Vec<Self::Record>, ResolverError>;

    /// Counts the records whose IDs are in `ids` and that satisfy
    /// `options.conditions`.
    ///
    /// Returns `Ok(None)` if the resolver cannot count, which is the default.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying data source.
    fn count(&self, ids: &[EntityId], options: &FindOptions) -> Result<Option<usize>, ResolverError> {
        let _ = (ids, options);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_count_projection() {
        let options = FindOptions::new()
            .order("id desc")
            .select(["id", "title"])
            .condition("published", true);

        assert!(options.has_conditions());
        assert_eq!(options.select.as_deref(), Some(&["id".to_string(), "title".to_string()][..]));

        let count = options.for_count();
        assert_eq!(count.order, None);
        assert_eq!(count.select, None);
        assert_eq!(count.conditions.get("published"), Some(&Value::Bool(true)));
    }

    #[test]
    fn default_count_is_unsupported() {
        struct Ids;

        impl RecordResolver for Ids {
            type Record = EntityId;

            fn find(&self, ids: &[EntityId], _: &FindOptions) -> Result<Vec<EntityId>, ResolverError> {
                Ok(ids.to_vec())
            }
        }

        assert_eq!(Ids.count(&[EntityId::from(1u64)], &FindOptions::new()).unwrap(), None);
    }
}
