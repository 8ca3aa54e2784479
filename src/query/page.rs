//! # Pagination Window

use serde::{Deserialize, Serialize};

/// Page number when none is given
pub const DEFAULT_PAGE: usize = 1;

/// Page size when none is given
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default ceiling on page size
pub const MAX_PAGE_SIZE: usize = 1000;

/// A 1-based page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: usize,
    pub limit: usize,
}

impl PageWindow {
    /// Both values are raised to at least 1
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of documents to skip
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// Parse a positive integer; anything else is treated as absent
pub(crate) fn parse_positive(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}
