//! Caller-owned record collection shared with the view engine.
//!
//! A [`Dataset`] is a cheap handle; clones see the same rows. Every
//! structural mutation made through the handle advances its generation,
//! which is what [`ChangeDetector`](crate::detect::ChangeDetector) watches.
//! Rows are immutable behind [`RecordRef`], so a row can only change by
//! being replaced, and replacing is structural.
//!
//! The handle is `!Send`: one writer at a time, on the thread that drives
//! `evaluate()`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tabula_model::{Record, RecordRef};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

struct DatasetInner {
    rows: Vec<RecordRef>,
    generation: u64,
}

#[derive(Clone)]
pub struct Dataset {
    id: u64,
    inner: Rc<RefCell<DatasetInner>>,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Dataset")
            .field("id", &self.id)
            .field("generation", &inner.generation)
            .field("len", &inner.rows.len())
            .finish()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset::from_refs(Vec::new())
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_refs(rows: Vec<RecordRef>) -> Self {
        Dataset {
            id: NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed),
            inner: Rc::new(RefCell::new(DatasetInner {
                rows,
                generation: 0,
            })),
        }
    }

    /// Identity of the handle. Clones share it; separately built datasets
    /// never do.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Structural generation; advances on every accepted mutation.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<RecordRef> {
        self.inner.borrow().rows.get(index).cloned()
    }

    /// Read the rows without copying. `f` must not mutate this dataset.
    pub fn with_rows<R>(&self, f: impl FnOnce(&[RecordRef]) -> R) -> R {
        f(&self.inner.borrow().rows)
    }

    pub fn push(&self, record: Record) {
        self.push_ref(Arc::new(record));
    }

    pub fn push_ref(&self, record: RecordRef) {
        self.mutate(|rows| {
            rows.push(record);
            true
        });
    }

    /// Returns `false` and leaves the rows untouched when `index > len`.
    pub fn insert(&self, index: usize, record: Record) -> bool {
        self.mutate(|rows| {
            if index > rows.len() {
                return false;
            }
            rows.insert(index, Arc::new(record));
            true
        })
    }

    pub fn remove(&self, index: usize) -> Option<RecordRef> {
        let mut removed = None;
        self.mutate(|rows| {
            if index < rows.len() {
                removed = Some(rows.remove(index));
            }
            removed.is_some()
        });
        removed
    }

    /// Swap in a new row at `index`, returning the previous one.
    pub fn replace(&self, index: usize, record: Record) -> Option<RecordRef> {
        let mut previous = None;
        self.mutate(|rows| {
            if let Some(slot) = rows.get_mut(index) {
                previous = Some(std::mem::replace(slot, Arc::new(record)));
            }
            previous.is_some()
        });
        previous
    }

    pub fn swap(&self, a: usize, b: usize) -> bool {
        self.mutate(|rows| {
            if a == b || a >= rows.len() || b >= rows.len() {
                return false;
            }
            rows.swap(a, b);
            true
        })
    }

    pub fn retain(&self, mut keep: impl FnMut(&Record) -> bool) {
        self.mutate(|rows| {
            let before = rows.len();
            rows.retain(|row| keep(row));
            rows.len() != before
        });
    }

    pub fn clear(&self) {
        self.mutate(|rows| {
            let changed = !rows.is_empty();
            rows.clear();
            changed
        });
    }

    /// Replace every row while keeping the handle identity.
    pub fn reset<I>(&self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        let fresh: Vec<RecordRef> = records.into_iter().map(Arc::new).collect();
        self.mutate(|rows| {
            *rows = fresh;
            true
        });
    }

    /// Arbitrary structural edit; always counts as a change.
    pub fn update(&self, edit: impl FnOnce(&mut Vec<RecordRef>)) {
        self.mutate(|rows| {
            edit(rows);
            true
        });
    }

    pub fn ptr_eq(&self, other: &Dataset) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn mutate(&self, edit: impl FnOnce(&mut Vec<RecordRef>) -> bool) -> bool {
        let mut inner = self.inner.borrow_mut();
        let changed = edit(&mut inner.rows);
        if changed {
            inner.generation += 1;
        }
        changed
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        records.into_iter().collect()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Dataset::from_refs(iter.into_iter().map(Arc::new).collect())
    }
}
