//! Per-domain field accessors.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use docadmin_core::types::SortSpec;

use crate::filter::MatchMode;

/// A record a view can filter, sort and aggregate.
///
/// Everything else about the record is opaque to the view.
pub trait ViewRecord: Clone + Debug + Send + Sync + 'static {
    /// Categorical facets the record can be filtered by.
    type Facet: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// Fields the record can be sorted by.
    type SortKey: Copy + Eq + Debug + Send + Sync + 'static;

    /// Fields searched by the free-text query.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Value of a facet, if the record has one.
    fn facet(&self, facet: Self::Facet) -> Option<Cow<'_, str>>;

    /// How selector values are compared for `facet`.
    fn match_mode(facet: Self::Facet) -> MatchMode;

    /// Bucket used when counting records per facet value.
    fn facet_bucket(&self, facet: Self::Facet) -> Option<Cow<'_, str>> {
        self.facet(facet)
    }

    /// Instant the date-range filter applies to.
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Value compared when sorting by `key`.
    fn sort_value(&self, key: Self::SortKey) -> SortValue<'_>;

    /// Size counted in aggregates.
    fn size_bytes(&self) -> u64 {
        0
    }

    /// Sort applied before the user picks one.
    fn default_sort() -> SortSpec<Self::SortKey>;
}

/// A comparable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    /// Compared case-insensitively.
    Text(Cow<'a, str>),
    /// Compared numerically.
    Number(f64),
    /// Compared by instant; missing sorts as the epoch.
    Date(Option<DateTime<Utc>>),
}

impl<'a> SortValue<'a> {
    /// Text value from an optional string; missing compares as empty.
    pub fn text(value: Option<&'a str>) -> Self {
        Self::Text(Cow::Borrowed(value.unwrap_or_default()))
    }

    /// Compare two values. Values of different kinds compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
                .cmp(&b.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)),
            _ => Ordering::Equal,
        }
    }
}
