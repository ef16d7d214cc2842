//! Per-view filter state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use docadmin_core::types::SortSpec;

use super::date::{DatePreset, DateRange};
use super::selector::Selector;
use crate::record::ViewRecord;

/// Source of filter revisions, shared by every filter state so that two
/// distinct states never carry the same revision.
static REVISIONS: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    REVISIONS.fetch_add(1, Ordering::Relaxed)
}

/// Query, selectors, date range and sort for one view.
///
/// Every mutation takes a fresh [`revision`](Self::revision), which the
/// view model uses as part of its memoization key. Revisions are unique
/// process-wide; only clones share one.
pub struct FilterState<R: ViewRecord> {
    query: String,
    selectors: Vec<(R::Facet, Selector)>,
    range: DateRange,
    preset: DatePreset,
    sort: SortSpec<R::SortKey>,
    revision: u64,
}

impl<R: ViewRecord> Clone for FilterState<R> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            selectors: self.selectors.clone(),
            range: self.range,
            preset: self.preset,
            sort: self.sort,
            revision: self.revision,
        }
    }
}

impl<R: ViewRecord> fmt::Debug for FilterState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterState")
            .field("query", &self.query)
            .field("selectors", &self.selectors)
            .field("range", &self.range)
            .field("sort", &self.sort)
            .field("revision", &self.revision)
            .finish()
    }
}

impl<R: ViewRecord> Default for FilterState<R> {
    fn default() -> Self {
        Self {
            query: String::new(),
            selectors: Vec::new(),
            range: DateRange::default(),
            preset: DatePreset::All,
            sort: R::default_sort(),
            revision: next_revision(),
        }
    }
}

impl<R: ViewRecord> FilterState<R> {
    /// "No filter" state with the record type's default sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Selector for `facet`.
    pub fn selector(&self, facet: R::Facet) -> &Selector {
        self.selectors
            .iter()
            .find(|(f, _)| *f == facet)
            .map(|(_, s)| s)
            .unwrap_or(&Selector::All)
    }

    /// Active date range.
    pub fn date_range(&self) -> DateRange {
        self.range
    }

    /// Preset the date range was last resolved from.
    pub fn date_preset(&self) -> DatePreset {
        self.preset
    }

    /// Active sort.
    pub fn sort(&self) -> SortSpec<R::SortKey> {
        self.sort
    }

    /// Mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set the free-text query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.touch();
    }

    /// Set the selector for `facet`.
    pub fn select(&mut self, facet: R::Facet, selector: impl Into<Selector>) {
        let selector = selector.into();
        match self.selectors.iter_mut().find(|(f, _)| *f == facet) {
            Some((_, current)) => *current = selector,
            None => self.selectors.push((facet, selector)),
        }
        self.touch();
    }

    /// Set explicit date bounds.
    pub fn set_date_range(&mut self, range: DateRange) {
        self.range = range;
        self.preset = DatePreset::All;
        self.touch();
    }

    /// Resolve a relative preset against `now`.
    pub fn apply_preset(&mut self, preset: DatePreset, now: DateTime<Utc>) {
        self.range = preset.resolve(now);
        self.preset = preset;
        self.touch();
    }

    /// Sort by `key`: the active key toggles direction, a new key sorts
    /// ascending.
    pub fn sort_by(&mut self, key: R::SortKey) {
        self.sort.select(key);
        self.touch();
    }

    /// Replace the sort outright.
    pub fn set_sort(&mut self, sort: SortSpec<R::SortKey>) {
        self.sort = sort;
        self.touch();
    }

    /// Reset query, selectors, date range and sort.
    pub fn clear_all(&mut self) {
        let revision = self.revision;
        *self = Self::default();
        self.revision = revision;
        self.touch();
    }

    /// Whether any predicate is active.
    pub fn is_filtering(&self) -> bool {
        !self.query.is_empty()
            || !self.range.is_unbounded()
            || self.selectors.iter().any(|(_, s)| !s.is_all())
    }

    /// Whether `record` passes every predicate.
    pub fn matches(&self, record: &R) -> bool {
        self.matches_query(record) && self.matches_facets(record)
    }

    /// Whether `record` passes the selectors and the date range.
    pub fn matches_facets(&self, record: &R) -> bool {
        self.selectors.iter().all(|(facet, selector)| {
            selector.matches(record.facet(*facet).as_deref(), R::match_mode(*facet))
        }) && self.range.contains(record.timestamp())
    }

    /// Whether `record` passes the free-text query.
    pub fn matches_query(&self, record: &R) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserFacet;
    use docadmin_entity::user::User;

    #[test]
    fn test_revisions_are_unique_across_states() {
        let mut a = FilterState::<User>::new();
        let b = FilterState::<User>::new();
        assert_ne!(a.revision(), b.revision());

        let copy = a.clone();
        assert_eq!(copy.revision(), a.revision());

        a.select(UserFacet::Status, "active");
        assert_ne!(a.revision(), copy.revision());
        assert_ne!(a.revision(), b.revision());
    }
}
