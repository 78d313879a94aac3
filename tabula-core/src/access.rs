//! Absence-tolerant field access over schemaless records.

use serde_json::Value;
use tabula_model::{FieldPath, Record};

/// Result of walking a [`FieldPath`] through a record.
///
/// `Absent` covers missing keys, `null`, out-of-range indices and paths that
/// continue through a scalar. It is a regular sortable value: the comparator
/// orders it after every present value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Present(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Present(value) => Some(value),
        }
    }
}

/// Walk `path` segment by segment. Objects are keyed by segment, arrays by
/// a numeric segment. The walk stops at the first absent step.
///
/// An empty path resolves to the record itself.
pub fn resolve<'a>(record: &'a Record, path: &FieldPath) -> FieldValue<'a> {
    let mut current = record;
    for segment in path.segments() {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return FieldValue::Absent,
        }
    }

    if current.is_null() {
        FieldValue::Absent
    } else {
        FieldValue::Present(current)
    }
}
