//! Static news content.

pub mod model;

pub use model::NewsItem;
