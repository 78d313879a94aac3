use crate::sort::{SortBy, SortOrder};

/// Published whenever an accepted sort change marks the view dirty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SortEvent {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Published on page changes and whenever the page is re-clamped against
/// the dataset length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PageEvent {
    pub active_page: usize,
    pub rows_on_page: usize,
    pub data_length: usize,
}
