//! Debounced remote search.
//!
//! Each keystroke calls [`DebouncedSearch::input`], which bumps a request
//! generation and restarts the debounce timer. Only a query that survives
//! the debounce window reaches the backend, and a response is published
//! only if its generation is still the latest when it arrives.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use docadmin_core::traits::RemoteSearch;

/// Published state of a debounced search.
pub enum SearchState<T> {
    /// No query; the view filters locally.
    Idle,
    /// Waiting for the debounce window or the backend.
    Pending { query: String },
    /// Results for `query`.
    Ready { query: String, results: Arc<Vec<T>> },
    /// The backend failed for `query`.
    Failed { query: String, message: String },
}

impl<T> Clone for SearchState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Pending { query } => Self::Pending {
                query: query.clone(),
            },
            Self::Ready { query, results } => Self::Ready {
                query: query.clone(),
                results: Arc::clone(results),
            },
            Self::Failed { query, message } => Self::Failed {
                query: query.clone(),
                message: message.clone(),
            },
        }
    }
}

impl<T> fmt::Debug for SearchState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Pending { query } => write!(f, "Pending({query:?})"),
            Self::Ready { query, results } => write!(f, "Ready({query:?}, {} results)", results.len()),
            Self::Failed { query, message } => write!(f, "Failed({query:?}, {message:?})"),
        }
    }
}

/// Debounces queries into a [`RemoteSearch`] backend.
pub struct DebouncedSearch<T: Send + Sync + 'static> {
    backend: Arc<dyn RemoteSearch<T>>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<CancellationToken>>,
    state: Arc<watch::Sender<SearchState<T>>>,
}

impl<T: Send + Sync + 'static> DebouncedSearch<T> {
    /// Create a search with the given debounce window.
    pub fn new(backend: Arc<dyn RemoteSearch<T>>, delay: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            backend,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    /// Feed the current input. Returns the request generation it was
    /// assigned. An empty query cancels any pending search and goes idle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&self, query: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        let query = query.trim().to_string();
        if query.is_empty() {
            cancel.cancel();
            self.state.send_replace(SearchState::Idle);
            return generation;
        }

        self.state.send_replace(SearchState::Pending {
            query: query.clone(),
        });

        let backend = Arc::clone(&self.backend);
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            debug!(%query, generation, "Running remote search");
            let next = match backend.search(&query).await {
                Ok(results) => SearchState::Ready {
                    query: query.clone(),
                    results: Arc::new(results),
                },
                Err(e) => {
                    warn!(%query, error = %e, "Remote search failed");
                    SearchState::Failed {
                        query: query.clone(),
                        message: e.user_message(),
                    }
                }
            };

            state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    debug!(%query, generation, "Discarding stale search response");
                    return false;
                }
                *current = next;
                true
            });
        });

        generation
    }

    /// Latest request generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState<T>> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SearchState<T> {
        self.state.borrow().clone()
    }

    /// Results of the latest query, once ready.
    pub fn results(&self) -> Option<Arc<Vec<T>>> {
        match &*self.state.borrow() {
            SearchState::Ready { results, .. } => Some(Arc::clone(results)),
            _ => None,
        }
    }
}

impl<T: Send + Sync + 'static> Drop for DebouncedSearch<T> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(cancel) = pending.take() {
                cancel.cancel();
            }
        }
    }
}
