//! Pagination metadata and page arithmetic.

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, 1-based.
    pub current: u32,
    /// Number of pages.
    pub pages: u32,
    /// Number of records across all pages.
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            pages: 1,
            total: 0,
        }
    }
}

impl Pagination {
    /// Metadata for an unpaginated response of `total` items.
    pub fn single_page(total: u64) -> Self {
        Self {
            current: 1,
            pages: 1,
            total,
        }
    }

    /// Enforce `1 <= current <= pages`. Servers report `pages: 0` for empty
    /// result sets; that is folded into a single empty page.
    pub fn normalized(self) -> Self {
        let pages = self.pages.max(1);
        let current = clamp_page(self.current, pages);
        if current != self.current || pages != self.pages {
            tracing::debug!(
                "normalized pagination {}/{} to {}/{}",
                self.current,
                self.pages,
                current,
                pages
            );
        }
        Self {
            current,
            pages,
            total: self.total,
        }
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.current < self.pages
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    /// Account for one record created locally.
    pub fn record_created(&mut self, per_page: u32) {
        self.total = self.total.saturating_add(1);
        self.pages = self.pages.max(calculate_total_pages(self.total, per_page));
    }

    /// Account for one record removed locally. `current` is clamped if the
    /// last page disappears.
    pub fn record_removed(&mut self, per_page: u32) {
        self.total = self.total.saturating_sub(1);
        self.pages = calculate_total_pages(self.total, per_page);
        self.current = clamp_page(self.current, self.pages);
    }
}

/// Clamp `page` into `1..=total_pages`.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.max(1).min(total_pages.max(1))
}

/// Pages needed for `len` records; never less than one.
pub fn calculate_total_pages(len: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    if len == 0 {
        1
    } else {
        let pages = len.saturating_add(per_page - 1) / per_page;
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }
}
