//! Search results and pagination metadata.

use serde::Serialize;

/// Page window of a paginated search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: usize,
    /// Records per page.
    pub per_page: usize,
    /// Records skipped before this page.
    pub offset: usize,
    /// Maximum records on this page.
    pub limit: usize,
    /// Records matching the search across all pages.
    pub total_entries: usize,
}

impl Pagination {
    /// Computes the window for `page`. Pages below 1 are treated as 1 and a
    /// zero page size as 1. An offset past `usize::MAX` saturates.
    #[must_use]
    pub fn new(page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        Self {
            page,
            per_page,
            offset: (page - 1).saturating_mul(per_page),
            limit: per_page,
            total_entries: 0,
        }
    }

    /// Sets the total number of matching records.
    #[must_use]
    pub fn with_total(mut self, total_entries: usize) -> Self {
        self.total_entries = total_entries;
        self
    }

    /// Returns the number of pages needed for all matching records.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_entries.div_ceil(self.per_page)
    }

    /// Returns true if a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Records returned by a search, with the page window when paginated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matches<T> {
    /// The resolved records, in the order the resolver returned them.
    pub records: Vec<T>,
    /// Page window, present only for paginated searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Matches<T> {
    /// Creates an unpaginated result.
    #[must_use]
    pub fn all(records: Vec<T>) -> Self {
        Self {
            records,
            pagination: None,
        }
    }

    /// Creates a paginated result.
    #[must_use]
    pub fn page(records: Vec<T>, pagination: Pagination) -> Self {
        Self {
            records,
            pagination: Some(pagination),
        }
    }

    /// Returns the total number of matches: the page total when paginated,
    /// otherwise the number of records.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.pagination
            .map_or(self.records.len(), |p| p.total_entries)
    }

    /// Returns the number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> IntoIterator for Matches<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
