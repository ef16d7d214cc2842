//! Categorical selectors.

use std::fmt;

/// Sentinel selector value that disables a facet filter.
pub const ALL: &str = "all";

/// Selector for one facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selector {
    /// No filtering.
    #[default]
    All,
    /// Keep records whose facet matches this value.
    Value(String),
}

impl Selector {
    /// Parse a selector; `all` and the empty string disable the filter.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Value(raw.to_string())
        }
    }

    /// Whether the selector filters anything.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether `value` passes this selector under `mode`.
    pub fn matches(&self, value: Option<&str>, mode: MatchMode) -> bool {
        match self {
            Self::All => true,
            Self::Value(wanted) => value.is_some_and(|v| mode.matches(v, wanted)),
        }
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Value(v) => f.write_str(v),
        }
    }
}

/// How a facet value is compared with a selector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Byte-for-byte equality.
    Exact,
    /// Equality ignoring case.
    CaseInsensitive,
    /// The value is a file name ending in `.<selector>`, ignoring case.
    Extension,
}

impl MatchMode {
    /// Compare a record value with a selector value.
    pub fn matches(self, value: &str, wanted: &str) -> bool {
        match self {
            Self::Exact => value == wanted,
            Self::CaseInsensitive => value.to_lowercase() == wanted.to_lowercase(),
            Self::Extension => {
                let ext = wanted.trim_start_matches('.').to_lowercase();
                !ext.is_empty() && value.to_lowercase().ends_with(&format!(".{ext}"))
            }
        }
    }
}
