//! # docadmin-view
//!
//! Derived views over fetched collections.
//!
//! A view is a pure function of a collection snapshot and a
//! [`FilterState`]: free-text query, categorical selectors, a date range and
//! a sort. Each record type describes the fields the view reads through
//! [`ViewRecord`]; [`derive`] and [`aggregate`] are shared by every domain.
//!
//! [`ViewModel`] memoizes the derived collection by revision, and
//! [`DebouncedSearch`] delegates non-empty queries to a remote search
//! endpoint, discarding responses to superseded queries.

pub mod derive;
pub mod domain;
pub mod export;
pub mod filter;
pub mod format;
pub mod model;
pub mod record;
pub mod search;

pub use derive::{Aggregate, aggregate, derive, derive_searched, sort_records};
pub use export::{AUDIT_CSV_HEADER, audit_csv, audit_csv_filename};
pub use filter::{DatePreset, DateRange, FilterState, MatchMode, Selector};
pub use format::{format_display_date, format_size, format_timestamp};
pub use model::ViewModel;
pub use record::{SortValue, ViewRecord};
pub use search::{DebouncedSearch, SearchState};
