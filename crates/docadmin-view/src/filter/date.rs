//! Date-range filtering.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use docadmin_core::error::AppError;

/// Inclusive instant bounds. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Upper bound.
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Range with the given bounds.
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Range with only a lower bound.
    pub fn since(from: DateTime<Utc>) -> Self {
        Self::new(Some(from), None)
    }

    /// Whether neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether `at` lies within the range.
    ///
    /// Records without a timestamp only pass an unbounded range.
    pub fn contains(&self, at: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(at) = at else {
            return false;
        };
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Relative date presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePreset {
    /// `1h`
    LastHour,
    /// `24h`
    LastDay,
    /// `7d`
    LastWeek,
    /// `30d`
    LastMonth,
    /// `all`
    #[default]
    All,
}

impl DatePreset {
    /// Every preset in selector order.
    pub const ALL_PRESETS: [Self; 5] = [
        Self::All,
        Self::LastHour,
        Self::LastDay,
        Self::LastWeek,
        Self::LastMonth,
    ];

    /// Selector value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastHour => "1h",
            Self::LastDay => "24h",
            Self::LastWeek => "7d",
            Self::LastMonth => "30d",
            Self::All => "all",
        }
    }

    /// Look-back window, `None` for `all`.
    pub fn window(&self) -> Option<Duration> {
        match self {
            Self::LastHour => Some(Duration::hours(1)),
            Self::LastDay => Some(Duration::days(1)),
            Self::LastWeek => Some(Duration::days(7)),
            Self::LastMonth => Some(Duration::days(30)),
            Self::All => None,
        }
    }

    /// Resolve to a range relative to `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateRange {
        match self.window() {
            Some(window) => DateRange::since(now - window),
            None => DateRange::default(),
        }
    }
}

impl FromStr for DatePreset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_PRESETS
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Unknown date range '{s}'. Expected one of: all, 1h, 24h, 7d, 30d"
                ))
            })
    }
}
