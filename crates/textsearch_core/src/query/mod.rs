//! Search requests.
//!
//! Two request shapes are supported and deliberately combine sets the
//! opposite way round:
//!
//! | Shape | Values of one field | Across fields |
//! |-------|---------------------|---------------|
//! | [`FieldsQuery`] (`{field: values}`) | OR (union) | AND (intersection) |
//! | [`TermsQuery`] (`values, fields: [..]`) | AND (intersection) | OR (union) |

mod engine;
mod pagination;

pub use engine::QueryEngine;
pub use pagination::{Matches, Pagination};

/// One or more search values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values(Vec<String>);

impl Values {
    /// Returns the values.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Values {
    fn from(v: &str) -> Self {
        Self(vec![v.to_string()])
    }
}

impl From<String> for Values {
    fn from(v: String) -> Self {
        Self(vec![v])
    }
}

impl From<Vec<String>> for Values {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<Vec<&str>> for Values {
    fn from(v: Vec<&str>) -> Self {
        Self(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Values {
    fn from(v: [&str; N]) -> Self {
        Self(v.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Map-form request: each field must match, any of its values may match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldsQuery {
    fields: Vec<(String, Values)>,
}

impl FieldsQuery {
    /// Adds a field and the values it may match. Repeating a field appends
    /// to its values.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, values: impl Into<Values>) -> Self {
        let name = name.into();
        let values = values.into();
        match self.fields.iter_mut().find(|(f, _)| *f == name) {
            Some((_, existing)) => existing.0.extend(values.0),
            None => self.fields.push((name, values)),
        }
        self
    }

    /// Returns the fields with their values in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Values)] {
        &self.fields
    }
}

/// Positional-form request: all values must match within one field, any
/// field may match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermsQuery {
    values: Values,
    fields: Option<Vec<String>>,
}

impl TermsQuery {
    /// Restricts the search to `fields` instead of every indexed field.
    #[must_use]
    pub fn in_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the search values.
    #[must_use]
    pub fn values(&self) -> &[String] {
        self.values.as_slice()
    }

    /// Returns the restricted fields, or `None` for every indexed field.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }
}

/// A search request in either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `{field: value | [values]}`
    Fields(FieldsQuery),
    /// `value, value, fields: [..]`
    Terms(TermsQuery),
}

impl Query {
    /// Starts a map-form request.
    ///
    /// ```rust
    /// use textsearch_core::Query;
    ///
    /// let q = Query::fields().field("tags", ["technical", "mysql"]).field("title", "mo");
    /// assert_eq!(q.entries().len(), 2);
    /// ```
    #[must_use]
    pub fn fields() -> FieldsQuery {
        FieldsQuery::default()
    }

    /// Starts a positional-form request.
    ///
    /// ```rust
    /// use textsearch_core::Query;
    ///
    /// let q = Query::terms(["plain", "text"]).in_fields(["title"]);
    /// assert_eq!(q.values().len(), 2);
    /// ```
    #[must_use]
    pub fn terms(values: impl Into<Values>) -> TermsQuery {
        TermsQuery {
            values: values.into(),
            fields: None,
        }
    }
}

impl From<FieldsQuery> for Query {
    fn from(q: FieldsQuery) -> Self {
        Self::Fields(q)
    }
}

impl From<TermsQuery> for Query {
    fn from(q: TermsQuery) -> Self {
        Self::Terms(q)
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self::Terms(Query::terms(value))
    }
}
