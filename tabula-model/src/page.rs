use crate::error::{ModelError, Result};

pub const DEFAULT_ACTIVE_PAGE: usize = 1;
pub const DEFAULT_ROWS_ON_PAGE: usize = 1000;

/// Active page (1-based) and page size. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PageSpec {
    active_page: usize,
    rows_on_page: usize,
}

impl PageSpec {
    pub fn new(active_page: usize, rows_on_page: usize) -> Result<Self> {
        if rows_on_page == 0 {
            return Err(ModelError::ZeroRowsOnPage);
        }
        if active_page == 0 {
            return Err(ModelError::ZeroActivePage);
        }
        Ok(PageSpec {
            active_page,
            rows_on_page,
        })
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn rows_on_page(&self) -> usize {
        self.rows_on_page
    }

    /// Same page size, another active page. Zero maps to the first page.
    pub fn with_active_page(self, active_page: usize) -> Self {
        PageSpec {
            active_page: active_page.max(1),
            ..self
        }
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            active_page: DEFAULT_ACTIVE_PAGE,
            rows_on_page: DEFAULT_ROWS_ON_PAGE,
        }
    }
}
