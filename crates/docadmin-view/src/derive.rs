//! Filter, sort and aggregate over a collection snapshot.

use std::collections::{BTreeMap, HashMap};

use docadmin_core::types::SortSpec;

use crate::filter::FilterState;
use crate::record::ViewRecord;

/// Apply `filter` to `records`: keep matching records, then sort stably.
///
/// Pure: the same inputs always yield the same output, order included.
pub fn derive<R: ViewRecord>(records: &[R], filter: &FilterState<R>) -> Vec<R> {
    let mut derived: Vec<R> = records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect();
    sort_records(&mut derived, filter.sort());
    derived
}

/// Like [`derive`] but ignores the free-text query, for records that came
/// back from a remote search already matching it.
pub fn derive_searched<R: ViewRecord>(records: &[R], filter: &FilterState<R>) -> Vec<R> {
    let mut derived: Vec<R> = records
        .iter()
        .filter(|record| filter.matches_facets(record))
        .cloned()
        .collect();
    sort_records(&mut derived, filter.sort());
    derived
}

/// Stable sort by one key.
pub fn sort_records<R: ViewRecord>(records: &mut [R], sort: SortSpec<R::SortKey>) {
    records.sort_by(|a, b| {
        sort.direction
            .apply(a.sort_value(sort.field).compare(&b.sort_value(sort.field)))
    });
}

/// Counts over a derived collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<F: std::hash::Hash + Eq> {
    /// Number of records.
    pub total: usize,
    /// Sum of record sizes in bytes.
    pub total_size: u64,
    /// Records per value, for each requested facet. Records without a
    /// value are not counted.
    pub facet_counts: HashMap<F, BTreeMap<String, usize>>,
}

impl<F: std::hash::Hash + Eq> Aggregate<F> {
    /// Count for one facet value.
    pub fn count(&self, facet: F, value: &str) -> usize {
        self.facet_counts
            .get(&facet)
            .and_then(|counts| counts.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct values seen for a facet.
    pub fn distinct(&self, facet: F) -> usize {
        self.facet_counts.get(&facet).map_or(0, BTreeMap::len)
    }
}

/// Count records, sum their sizes, and bucket them per facet.
pub fn aggregate<R: ViewRecord>(records: &[R], facets: &[R::Facet]) -> Aggregate<R::Facet> {
    let mut facet_counts: HashMap<R::Facet, BTreeMap<String, usize>> =
        facets.iter().map(|f| (*f, BTreeMap::new())).collect();

    for record in records {
        for facet in facets {
            if let Some(bucket) = record.facet_bucket(*facet) {
                if let Some(counts) = facet_counts.get_mut(facet) {
                    *counts.entry(bucket.into_owned()).or_default() += 1;
                }
            }
        }
    }

    Aggregate {
        total: records.len(),
        total_size: records.iter().map(ViewRecord::size_bytes).sum(),
        facet_counts,
    }
}
