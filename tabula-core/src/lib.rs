//! # Tabula Core
//!
//! Reactive tabular view engine: turns a caller-owned, mutable collection of
//! schemaless records into a sorted, paginated slice and keeps that slice
//! consistent as the data, sort key or page size change.
//!
//! ## Overview
//!
//! - [`access`]: absence-tolerant dotted field paths
//! - [`compare`]: type-inferring, stable record comparators
//! - [`paging`]: page counts, clamping and page-size remapping
//! - [`detect`]: structural change detection between ticks
//! - [`engine`]: the [`ViewEngine`] orchestrator
//! - [`streams`]: replay-latest sort stream and page broadcast
//! - [`toggle`] / [`provider`]: header toggles and sortable-field lookup
//!
//! The engine is single-threaded and pull driven: call
//! [`ViewEngine::evaluate`] once per update cycle.
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use tabula_core::{Dataset, ViewEngine, ViewOptions};
//!
//! let dataset: Dataset = vec![
//!     json!({"id": "10", "name": "beta"}),
//!     json!({"id": "9", "name": "Alpha"}),
//! ]
//! .into();
//!
//! let mut view = ViewEngine::new(dataset.clone(), ViewOptions::default())?;
//! view.set_sort("id", "asc");
//! view.evaluate();
//! assert_eq!(view.slice()[0]["name"], "Alpha");
//!
//! dataset.push(json!({"id": "1", "name": "gamma"}));
//! assert!(view.evaluate());
//! assert_eq!(view.page().data_length, 3);
//! # Ok::<(), tabula_core::ViewError>(())
//! ```

#![allow(missing_docs)]

pub mod access;
pub mod compare;
pub mod dataset;
pub mod detect;
pub mod engine;
pub mod error;
pub mod paging;
pub mod provider;
pub mod streams;
pub mod toggle;

pub use access::{FieldValue, resolve};
pub use compare::{Comparator, NumericKey, SortKey, build_comparator};
pub use dataset::Dataset;
pub use detect::ChangeDetector;
pub use engine::{ViewEngine, ViewOptions};
pub use error::{Result, ViewError};
pub use provider::{SortSpecProvider, StaticSortFields};
pub use streams::{
    PageChangeStream, PageSubscription, SortChangeStream, SortSubscription,
};
pub use toggle::{SortIndicator, SortToggle};

pub use tabula_model::{
    FieldPath, PageEvent, PageSpec, Record, RecordRef, SortBy, SortEvent,
    SortOrder,
};
