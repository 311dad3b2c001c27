//! Offset pagination helpers.

/// One page of a result set: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Page count for `total` rows at `limit` per page (ceiling division).
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}
