//! Per-view state: the fetched collection, its filter, and the memoized
//! derived collection.

use std::sync::Arc;

use tracing::{debug, warn};

use docadmin_core::result::AppResult;

use crate::derive::{Aggregate, aggregate, derive, derive_searched};
use crate::filter::FilterState;
use crate::record::ViewRecord;

struct Memo<R> {
    key: (u64, u64),
    derived: Arc<Vec<R>>,
}

/// State behind one admin view.
///
/// The derived collection is recomputed only when the collection revision
/// or the filter revision changes. A failed fetch keeps the last good
/// collection and leaves a notice for the user.
pub struct ViewModel<R: ViewRecord> {
    name: &'static str,
    collection: Arc<Vec<R>>,
    revision: u64,
    remote: Option<Arc<Vec<R>>>,
    filter: FilterState<R>,
    memo: Option<Memo<R>>,
    notice: Option<String>,
}

impl<R: ViewRecord> ViewModel<R> {
    /// Empty view. `name` tags log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            collection: Arc::new(Vec::new()),
            revision: 0,
            remote: None,
            filter: FilterState::new(),
            memo: None,
            notice: None,
        }
    }

    /// The fetched collection, unfiltered.
    pub fn collection(&self) -> &[R] {
        &self.collection
    }

    /// Bumped whenever the collection or the remote results change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the collection.
    pub fn replace(&mut self, records: Vec<R>) {
        debug!(view = self.name, count = records.len(), "Collection replaced");
        self.collection = Arc::new(records);
        self.revision += 1;
    }

    /// Apply the outcome of a fetch.
    ///
    /// On failure the previous collection stays in place and the error's
    /// user message becomes the notice. Returns whether the collection
    /// changed.
    pub fn apply_fetch(&mut self, outcome: AppResult<Vec<R>>) -> bool {
        match outcome {
            Ok(records) => {
                self.replace(records);
                self.notice = None;
                true
            }
            Err(e) => {
                warn!(view = self.name, error = %e, "Fetch failed; keeping last collection");
                self.notice = Some(e.user_message());
                false
            }
        }
    }

    /// Install results of a remote search, or `None` to go back to local
    /// filtering.
    pub fn set_remote_results(&mut self, results: Option<Arc<Vec<R>>>) {
        self.remote = results;
        self.revision += 1;
    }

    /// Whether remote search results are being shown.
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Current filter.
    pub fn filter(&self) -> &FilterState<R> {
        &self.filter
    }

    /// Mutable filter. Mutations bump the filter revision.
    pub fn filter_mut(&mut self) -> &mut FilterState<R> {
        &mut self.filter
    }

    /// Derived collection, recomputed only when an input changed.
    pub fn derived(&mut self) -> Arc<Vec<R>> {
        let key = (self.revision, self.filter.revision());
        if let Some(memo) = &self.memo {
            if memo.key == key {
                return Arc::clone(&memo.derived);
            }
        }

        let derived = Arc::new(match &self.remote {
            Some(remote) => derive_searched(remote, &self.filter),
            None => derive(&self.collection, &self.filter),
        });
        self.memo = Some(Memo {
            key,
            derived: Arc::clone(&derived),
        });
        derived
    }

    /// Aggregate over the derived collection.
    pub fn stats(&mut self, facets: &[R::Facet]) -> Aggregate<R::Facet> {
        aggregate(&self.derived(), facets)
    }

    /// Pending notice, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Take the pending notice, clearing it.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
