//! Structural change detection between evaluation ticks.
//!
//! Detection is identity based: a dataset is unchanged while it is the same
//! handle at the same generation. Row contents are never inspected.

use crate::dataset::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    dataset_id: u64,
    generation: u64,
    len: usize,
}

impl Observation {
    fn of(dataset: &Dataset) -> Self {
        Observation {
            dataset_id: dataset.id(),
            generation: dataset.generation(),
            len: dataset.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<Observation>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report whether `dataset` changed structurally since the previous
    /// call, then remember its current shape. The first call always reports
    /// a change.
    pub fn detect(&mut self, dataset: &Dataset) -> bool {
        let current = Observation::of(dataset);
        let changed = self.last != Some(current);
        self.last = Some(current);
        changed
    }

    /// Remember `dataset` as seen without reporting anything.
    pub fn rebase(&mut self, dataset: &Dataset) {
        self.last = Some(Observation::of(dataset));
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
