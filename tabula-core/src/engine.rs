//! View engine: sort and page state over a shared dataset, recomputed on
//! demand.
//!
//! Three independent axes mark the view dirty: sort, page and dataset.
//! Setters publish change events as soon as a change is accepted;
//! [`ViewEngine::evaluate`] is the only place the slice is rebuilt. The
//! caller drives `evaluate` from its own update loop, once per refresh.

use tabula_model::{
    DEFAULT_ACTIVE_PAGE, DEFAULT_ROWS_ON_PAGE, PageEvent, PageSpec, RecordRef,
    SortBy, SortEvent, SortOrder,
};
use tracing::{debug, trace, warn};

use crate::compare::build_comparator;
use crate::dataset::Dataset;
use crate::detect::ChangeDetector;
use crate::error::{Result, ViewError};
use crate::paging::{
    clamp_page, page_window, remap_on_page_size_change, total_pages,
};
use crate::streams::{
    DEFAULT_PAGE_EVENT_CAPACITY, MAX_PAGE_EVENT_CAPACITY, PageChangeStream,
    PageSubscription, SortChangeStream, SortSubscription,
    page_event_capacity_in_range,
};

/// Initial configuration for a [`ViewEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub sort_by: SortBy,
    /// Raw direction; anything but `asc`/`desc` falls back to `asc`.
    pub sort_order: String,
    pub active_page: usize,
    pub rows_on_page: usize,
    /// Buffer of the page stream per subscriber.
    pub page_event_capacity: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::default(),
            sort_order: SortOrder::Asc.to_string(),
            active_page: DEFAULT_ACTIVE_PAGE,
            rows_on_page: DEFAULT_ROWS_ON_PAGE,
            page_event_capacity: DEFAULT_PAGE_EVENT_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub struct ViewEngine {
    dataset: Dataset,
    sort_by: SortBy,
    sort_order: SortOrder,
    page: PageSpec,
    dirty: bool,
    slice: Vec<RecordRef>,
    detector: ChangeDetector,
    sort_changes: SortChangeStream,
    page_changes: PageChangeStream,
}

impl ViewEngine {
    pub fn new(dataset: Dataset, options: ViewOptions) -> Result<Self> {
        if !page_event_capacity_in_range(options.page_event_capacity) {
            return Err(ViewError::InvalidConfiguration(format!(
                "page event capacity must be between 1 and \
                 {MAX_PAGE_EVENT_CAPACITY}, got {}",
                options.page_event_capacity
            )));
        }
        let page = PageSpec::new(options.active_page, options.rows_on_page)?;

        let (sort_order, coerced) = SortOrder::normalize(&options.sort_order);
        if coerced {
            warn_invalid_order(&options.sort_order);
        }

        let active = clamp_page(
            page.active_page(),
            total_pages(dataset.len(), page.rows_on_page()),
        );

        let mut detector = ChangeDetector::new();
        detector.rebase(&dataset);

        let engine = Self {
            dataset,
            sort_by: options.sort_by,
            sort_order,
            page: page.with_active_page(active),
            dirty: true,
            slice: Vec::new(),
            detector,
            sort_changes: SortChangeStream::new(),
            page_changes: PageChangeStream::new(options.page_event_capacity),
        };

        if !engine.sort_by.is_unsorted() {
            engine.sort_changes.publish(engine.sort());
        }

        Ok(engine)
    }

    pub fn sort(&self) -> SortEvent {
        SortEvent {
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
        }
    }

    pub fn sort_by(&self) -> &SortBy {
        &self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Change the sort from untyped input. Unknown directions fall back to
    /// `asc` with a warning.
    pub fn set_sort(&mut self, sort_by: impl Into<SortBy>, sort_order: &str) {
        let sort_by = sort_by.into();
        let (order, coerced) = SortOrder::normalize(sort_order);
        if self.accepts_sort(&sort_by, order) && coerced {
            warn_invalid_order(sort_order);
        }
        self.apply_sort(sort_by, order);
    }

    /// Typed form of [`set_sort`](Self::set_sort).
    pub fn apply_sort(&mut self, sort_by: impl Into<SortBy>, order: SortOrder) {
        let sort_by = sort_by.into();
        if !self.accepts_sort(&sort_by, order) {
            trace!(sort_by = %sort_by, order = %order, "sort unchanged");
            return;
        }

        debug!(sort_by = %sort_by, order = %order, "sort changed");
        self.sort_by = sort_by;
        self.sort_order = order;
        self.dirty = true;
        self.sort_changes.publish(self.sort());
    }

    fn accepts_sort(&self, sort_by: &SortBy, order: SortOrder) -> bool {
        *sort_by != self.sort_by || order != self.sort_order
    }

    pub fn page(&self) -> PageEvent {
        PageEvent {
            active_page: self.page.active_page(),
            rows_on_page: self.page.rows_on_page(),
            data_length: self.dataset.len(),
        }
    }

    pub fn page_spec(&self) -> PageSpec {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.dataset.len(), self.page.rows_on_page())
    }

    /// Change the page and/or page size.
    ///
    /// When only the page size changes, the active page moves so the row
    /// that was first on the old page stays visible. An explicitly different
    /// `active_page` is taken as requested. Either result is clamped to the
    /// current page count.
    pub fn set_page(
        &mut self,
        active_page: usize,
        rows_on_page: usize,
    ) -> Result<()> {
        let requested = PageSpec::new(active_page, rows_on_page)?;
        if requested == self.page {
            trace!(active_page, rows_on_page, "page unchanged");
            return Ok(());
        }

        let next_active = if active_page != self.page.active_page() {
            active_page
        } else {
            remap_on_page_size_change(
                self.page.active_page(),
                self.page.rows_on_page(),
                rows_on_page,
            )
        };
        let next_active = clamp_page(
            next_active,
            total_pages(self.dataset.len(), rows_on_page),
        );

        self.page = PageSpec::new(next_active, rows_on_page)?;
        self.dirty = true;
        debug!(
            active_page = self.page.active_page(),
            rows_on_page, "page changed"
        );
        self.page_changes.publish(self.page());
        Ok(())
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Swap in another dataset. The previous handle is released.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        debug!(
            previous = self.dataset.id(),
            next = dataset.id(),
            len = dataset.len(),
            "dataset replaced"
        );
        self.detector.rebase(&dataset);
        self.dataset = dataset;
        self.recalculate_page();
        self.slice.clear();
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the slice if anything changed since the last call.
    ///
    /// Structural dataset changes are picked up here, re-clamping the page
    /// and publishing one [`PageEvent`]. Returns `true` when the slice was
    /// rebuilt. A second call with no change in between does nothing.
    pub fn evaluate(&mut self) -> bool {
        if self.detector.detect(&self.dataset) {
            debug!(len = self.dataset.len(), "dataset changed structurally");
            self.recalculate_page();
            self.dirty = true;
        }

        if !self.dirty {
            return false;
        }

        let comparator = build_comparator(&self.sort_by, self.sort_order);
        let window = page_window(
            self.page.active_page(),
            self.page.rows_on_page(),
            self.dataset.len(),
        );
        self.slice = self.dataset.with_rows(|rows| {
            let mut sorted = comparator.sorted(rows);
            sorted.truncate(window.end);
            sorted.split_off(window.start)
        });
        self.dirty = false;

        trace!(
            rows = self.slice.len(),
            active_page = self.page.active_page(),
            "view recomputed"
        );
        true
    }

    /// The current slice as of the last [`evaluate`](Self::evaluate).
    pub fn slice(&self) -> &[RecordRef] {
        &self.slice
    }

    pub fn subscribe_sort_change(&self) -> SortSubscription {
        self.sort_changes.subscribe()
    }

    pub fn subscribe_page_change(&self) -> PageSubscription {
        self.page_changes.subscribe()
    }

    fn clamp_active_page(&mut self) {
        let active = clamp_page(self.page.active_page(), self.total_pages());
        self.page = self.page.with_active_page(active);
    }

    fn recalculate_page(&mut self) {
        self.clamp_active_page();
        self.page_changes.publish(self.page());
    }
}

fn warn_invalid_order(raw: &str) {
    warn!(
        sort_order = raw,
        "sort order must be one of [asc, desc]; falling back to asc"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn numbered(count: usize) -> Dataset {
        (1..=count).map(|n| json!({ "n": n })).collect()
    }

    fn engine(
        dataset: Dataset,
        active_page: usize,
        rows_on_page: usize,
    ) -> ViewEngine {
        ViewEngine::new(
            dataset,
            ViewOptions {
                active_page,
                rows_on_page,
                ..ViewOptions::default()
            },
        )
        .unwrap()
    }

    fn values(engine: &ViewEngine, field: &str) -> Vec<Value> {
        engine.slice().iter().map(|row| row[field].clone()).collect()
    }

    #[test]
    fn rejects_non_positive_configuration() {
        let zero_rows = ViewOptions {
            rows_on_page: 0,
            ..ViewOptions::default()
        };
        assert!(matches!(
            ViewEngine::new(Dataset::new(), zero_rows),
            Err(ViewError::InvalidConfiguration(_))
        ));

        let zero_capacity = ViewOptions {
            page_event_capacity: 0,
            ..ViewOptions::default()
        };
        assert!(ViewEngine::new(Dataset::new(), zero_capacity).is_err());

        for capacity in [MAX_PAGE_EVENT_CAPACITY + 1, usize::MAX] {
            let oversized = ViewOptions {
                page_event_capacity: capacity,
                ..ViewOptions::default()
            };
            assert!(matches!(
                ViewEngine::new(Dataset::new(), oversized),
                Err(ViewError::InvalidConfiguration(_))
            ));
        }
        let largest = ViewOptions {
            page_event_capacity: MAX_PAGE_EVENT_CAPACITY,
            ..ViewOptions::default()
        };
        assert!(ViewEngine::new(Dataset::new(), largest).is_ok());

        let mut view = engine(numbered(3), 1, 10);
        assert!(view.set_page(1, 0).is_err());
        assert!(view.set_page(0, 10).is_err());
        assert_eq!(view.page_spec().rows_on_page(), 10);
    }

    #[test]
    fn constructor_coerces_invalid_order_and_clamps_page() {
        let view = ViewEngine::new(
            numbered(5),
            ViewOptions {
                sort_by: "n".into(),
                sort_order: "sideways".to_string(),
                active_page: 9,
                rows_on_page: 2,
                ..ViewOptions::default()
            },
        )
        .unwrap();
        assert_eq!(view.sort_order(), SortOrder::Asc);
        assert_eq!(view.page().active_page, 3);
    }

    #[test]
    fn windows_the_sorted_dataset() {
        let mut view = engine(numbered(25), 3, 10);
        view.apply_sort("n", SortOrder::Desc);
        assert!(view.evaluate());
        let expected: Vec<_> = (1..=5).rev().map(|n| json!(n)).collect();
        assert_eq!(values(&view, "n"), expected);
    }

    #[test]
    fn empty_dataset_yields_page_one_and_empty_slice() {
        let mut view = engine(Dataset::new(), 4, 10);
        assert_eq!(view.page().active_page, 1);
        assert!(view.evaluate());
        assert!(view.slice().is_empty());
    }

    #[test]
    fn set_sort_is_noop_for_same_normalized_value() {
        let mut view = engine(numbered(3), 1, 10);
        view.set_sort("n", "asc");
        view.evaluate();
        let mut subscription = view.subscribe_sort_change();
        assert!(subscription.try_next().is_some());

        view.set_sort("n", "bogus");
        assert!(!view.is_dirty());
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn explicit_page_wins_over_remap() {
        let mut view = engine(numbered(100), 3, 10);
        view.set_page(7, 5).unwrap();
        assert_eq!(view.page().active_page, 7);
        assert_eq!(view.page().rows_on_page, 5);
    }

    #[test]
    fn explicit_page_is_clamped_to_page_count() {
        let mut view = engine(numbered(30), 1, 10);
        view.set_page(12, 10).unwrap();
        assert_eq!(view.page().active_page, 3);
    }

    #[test]
    fn set_dataset_drops_previous_handle() {
        let first = numbered(3);
        let mut view = engine(first.clone(), 1, 10);
        view.evaluate();
        view.set_dataset(numbered(1));

        assert!(!view.dataset().ptr_eq(&first));
        assert!(view.slice().is_empty());
        assert!(view.is_dirty());
        view.evaluate();
        assert_eq!(view.slice().len(), 1);
    }
}
