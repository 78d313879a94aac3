//! Core data model definitions shared across Tabula crates.
#![allow(missing_docs)]

pub mod error;
pub mod events;
pub mod page;
pub mod record;
pub mod sort;

pub use error::ModelError;
pub use events::{PageEvent, SortEvent};
pub use page::{DEFAULT_ACTIVE_PAGE, DEFAULT_ROWS_ON_PAGE, PageSpec};
pub use record::{FieldPath, Record, RecordRef};
pub use sort::{SortBy, SortOrder};
