//! Header sort toggles bound to one field path.
//!
//! A toggle listens on the engine's sort stream, so one mounted after the
//! table was already sorted shows the right indicator straight away.

use tabula_model::{FieldPath, SortEvent, SortOrder};

use crate::engine::ViewEngine;
use crate::provider::SortSpecProvider;
use crate::streams::SortSubscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortIndicator {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

#[derive(Debug)]
pub struct SortToggle {
    path: FieldPath,
    subscription: SortSubscription,
    indicator: SortIndicator,
}

impl SortToggle {
    pub fn new(path: impl Into<FieldPath>, engine: &ViewEngine) -> Self {
        let mut toggle = Self {
            path: path.into(),
            subscription: engine.subscribe_sort_change(),
            indicator: SortIndicator::Unsorted,
        };
        toggle.refresh();
        toggle
    }

    /// One toggle per sortable field of `table`, in provider order. Empty
    /// for an unknown table.
    pub fn for_table(
        provider: &impl SortSpecProvider,
        table: &str,
        engine: &ViewEngine,
    ) -> Vec<SortToggle> {
        provider
            .sortable_fields(table)
            .unwrap_or_default()
            .iter()
            .map(|path| SortToggle::new(path.clone(), engine))
            .collect()
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Apply any pending sort event and return the indicator.
    pub fn refresh(&mut self) -> SortIndicator {
        if let Some(event) = self.subscription.try_next() {
            self.indicator = self.indicator_for(&event);
        }
        self.indicator
    }

    pub fn indicator(&self) -> SortIndicator {
        self.indicator
    }

    /// Sort by this toggle's path: descending when it is currently sorted
    /// ascending by it, ascending otherwise.
    pub fn activate(&mut self, engine: &mut ViewEngine) {
        self.refresh();
        let order = match self.indicator {
            SortIndicator::Ascending => SortOrder::Desc,
            SortIndicator::Descending | SortIndicator::Unsorted => {
                SortOrder::Asc
            }
        };
        engine.apply_sort(self.path.clone(), order);
        self.refresh();
    }

    fn indicator_for(&self, event: &SortEvent) -> SortIndicator {
        if !event.sort_by.is_single(&self.path) {
            return SortIndicator::Unsorted;
        }
        match event.sort_order {
            SortOrder::Asc => SortIndicator::Ascending,
            SortOrder::Desc => SortIndicator::Descending,
        }
    }
}
