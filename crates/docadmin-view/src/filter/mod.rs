//! Filter state and its building blocks.

pub mod date;
pub mod selector;
pub mod state;

pub use date::{DatePreset, DateRange};
pub use selector::{MatchMode, Selector};
pub use state::FilterState;
