//! Pagination state.

use serde::Deserialize;
use serde::Serialize;

/// Zero-based pagination state.
///
/// `total_rows` counts rows after filtering and sorting (client mode) or the
/// total reported by the remote endpoint (server mode).
///
/// # Example
///
/// ```
/// use tabula_lib::query::PaginationState;
///
/// let mut page = PaginationState::new(10);
/// page.set_total_rows(25);
/// assert_eq!(page.total_pages(), 3);
/// page.go_to(99);
/// assert_eq!(page.page_index(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    page_index: usize,
    page_size: usize,
    total_rows: usize,
}

impl PaginationState {
    /// Largest accepted page size.
    pub const MAX_PAGE_SIZE: usize = 1000;

    /// Creates pagination on page 0 with no rows. The size is clamped into
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
            total_rows: 0,
        }
    }

    /// Returns the zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the total row count.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Returns `ceil(total_rows / page_size)`; zero when there are no rows.
    pub fn total_pages(&self) -> usize {
        self.total_rows.div_ceil(self.page_size)
    }

    /// Returns the highest legal page index.
    pub fn last_index(&self) -> usize {
        self.total_pages().saturating_sub(1)
    }

    /// Returns the index of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.page_index * self.page_size
    }

    /// Returns `true` if a next page exists.
    pub fn has_next(&self) -> bool {
        self.page_index < self.last_index()
    }

    /// Returns `true` if a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Moves to page `n`, clamped into `[0, max(0, total_pages - 1)]`.
    pub fn go_to(&mut self, n: i64) {
        let last = self.last_index() as i64;
        self.page_index = n.clamp(0, last) as usize;
    }

    /// Sets the page size and returns to page 0. The size is clamped into
    /// `1..=MAX_PAGE_SIZE`.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.clamp(1, Self::MAX_PAGE_SIZE);
        self.page_index = 0;
    }

    /// Updates the row count and clamps the page index.
    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.page_index = self.page_index.min(self.last_index());
    }

    /// Sets the page index without clamping.
    ///
    /// Used in server mode before the total of the requested page is known.
    pub(crate) fn set_page_index_unchecked(&mut self, page_index: usize) {
        self.page_index = page_index;
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(25)
    }
}
