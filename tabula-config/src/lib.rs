//! Shared configuration library for Tabula.
//!
//! Centralizes view defaults, config loading (environment, file, inline
//! JSON), the per-table sortable-field registry, and logging setup for the
//! `tabula-view` binary and embedding applications.

pub mod logging;
pub mod util;
pub mod view;

pub use view::{ConfigFormat, TableConfig, ViewConfig, ViewConfigSource};
