//! Sorting types for list views.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    /// Short label for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A sort specification consisting of a field key and direction.
///
/// `K` is the per-view field enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec<K> {
    /// Field to sort by.
    pub field: K,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl<K: PartialEq> SortSpec<K> {
    /// Create a new sort specification.
    pub fn new(field: K, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Ascending sort on the given field.
    pub fn asc(field: K) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending sort on the given field.
    pub fn desc(field: K) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Select a field as a column header click would.
    ///
    /// Selecting the active field flips its direction; selecting another
    /// field makes it active in ascending order.
    pub fn select(&mut self, field: K) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }
}
