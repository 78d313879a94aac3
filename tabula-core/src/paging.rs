//! Page arithmetic. Pages are 1-based; `rows_on_page` is always positive
//! by the time it reaches these functions.

use std::ops::Range;

/// Number of pages needed for `len` rows.
pub fn total_pages(len: usize, rows_on_page: usize) -> usize {
    len.div_ceil(rows_on_page)
}

/// Clamp `requested` to the last page; an empty dataset maps to page 1.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    let page = if total_pages < requested {
        total_pages
    } else {
        requested
    };
    page.max(1)
}

/// New active page after a page-size change, keeping the row that was
/// first on the old page visible.
pub fn remap_on_page_size_change(
    old_active_page: usize,
    old_rows_on_page: usize,
    new_rows_on_page: usize,
) -> usize {
    let first_row = old_active_page.saturating_sub(1) * old_rows_on_page + 1;
    first_row.div_ceil(new_rows_on_page)
}

/// Row range shown on `active_page`, clipped to `len`.
pub fn page_window(
    active_page: usize,
    rows_on_page: usize,
    len: usize,
) -> Range<usize> {
    let start = active_page
        .saturating_sub(1)
        .saturating_mul(rows_on_page)
        .min(len);
    let end = start.saturating_add(rows_on_page).min(len);
    start..end
}
