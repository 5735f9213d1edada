//! Pagination: slicing the sorted row list into the current page.

use std::ops::Range;

use crate::query::PaginationState;

/// Returns the range of `0..total` covered by the current page.
///
/// The range is empty when `total` is zero.
pub fn page_range(total: usize, pagination: &PaginationState) -> Range<usize> {
    let start = pagination.offset().min(total);
    let end = start.saturating_add(pagination.page_size()).min(total);
    start..end
}

/// Returns the slice of `sorted` on the current page.
pub fn apply(sorted: &[usize], pagination: &PaginationState) -> Vec<usize> {
    sorted[page_range(sorted.len(), pagination)].to_vec()
}
