//! # docadmin-entity
//!
//! Domain records fetched from the remote document platform API. Records are
//! kept close to the wire shape: the fields the console filters and sorts on
//! are typed, everything else is preserved in an `extra` map so a record
//! survives a fetch → edit → send round-trip unchanged.

pub mod audit;
pub mod document;
pub mod library;
pub mod news;
pub mod time;
pub mod user;
