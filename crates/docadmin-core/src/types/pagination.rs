//! Offset pagination used by the listing endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_LIMIT: u32 = 20;
/// Maximum page size accepted by the remote API.
const MAX_LIMIT: u32 = 1000;

/// `limit`/`offset` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u32,
}

impl PageRequest {
    /// Create a new page request. `limit` is clamped to `1..=1000`.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// First page of the given size.
    pub fn first(limit: u32) -> Self {
        Self::new(limit, 0)
    }

    /// The page following this one.
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }

    /// The page preceding this one, or `None` on the first page.
    pub fn previous(&self) -> Option<Self> {
        if self.offset == 0 {
            return None;
        }
        Some(Self {
            limit: self.limit,
            offset: self.offset.saturating_sub(self.limit),
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
