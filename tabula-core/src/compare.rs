//! Type-inferring comparators for schemaless records
//!
//! Each resolved leaf value is mapped to a [`SortKey`] once per sort, then
//! rows are ordered with a stable sort so equal keys keep dataset order.
//!
//! Inference order for a present value:
//! 1. all-digit text (or a JSON number) compares numerically; non-negative
//!    integers compare exactly at any length
//! 2. a string that parses as a calendar date compares as a UTC instant
//! 3. any other string compares lowercased
//! 4. everything else compares natively (`false < true`, structured values
//!    are all equal to each other)
//!
//! Keys of different classes never interleave. Ascending class order is
//! numeric, date, text, boolean, structured, absent. Descending order
//! reverses the whole key order, so absent values lead a descending sort.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::{Number, Value};
use tabula_model::{FieldPath, Record, RecordRef, SortBy, SortOrder};

use crate::access::{FieldValue, resolve};

static ALL_DIGITS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+$").expect("all-digit regex should compile")
});

// `%b` also accepts full month names when parsing.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %b, %Y",
    "%a, %b %d, %Y",
];

/// Numeric key. Values order by their `f64` approximation first; exact
/// integer digits break ties the approximation cannot see, so long numeric
/// ids keep integer order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumericKey {
    approx: OrderedFloat<f64>,
    exact: Option<IntegerDigits>,
}

/// Canonical digits of a non-negative integer. Length is compared before
/// the digits themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct IntegerDigits {
    len: usize,
    digits: String,
}

impl IntegerDigits {
    fn new(raw: &str) -> Self {
        let trimmed = raw.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        IntegerDigits {
            len: digits.len(),
            digits: digits.to_string(),
        }
    }
}

impl NumericKey {
    /// Key for all-digit text. `None` unless `text` is digits only.
    pub fn from_digits(text: &str) -> Option<Self> {
        if !ALL_DIGITS_PATTERN.is_match(text) {
            return None;
        }
        // parses to inf past f64 range; the digits still order those
        let approx = text.parse::<f64>().ok()?;
        Some(NumericKey {
            approx: OrderedFloat(approx),
            exact: Some(IntegerDigits::new(text)),
        })
    }

    pub fn from_number(number: &Number) -> Option<Self> {
        let approx = number.as_f64()?;
        let exact = number
            .as_u64()
            .map(|value| IntegerDigits::new(&value.to_string()));
        Some(NumericKey {
            approx: OrderedFloat(approx),
            exact,
        })
    }

}

/// Comparable key inferred from one field of one record.
///
/// The variant order is the cross-class order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Numeric(NumericKey),
    Date(DateTime<Utc>),
    Text(String),
    Bool(bool),
    Structured,
    Absent,
}

impl SortKey {
    /// Infer the key for a resolved field value.
    pub fn infer(value: FieldValue<'_>) -> SortKey {
        match value {
            FieldValue::Absent => SortKey::Absent,
            FieldValue::Present(value) => SortKey::from_value(value),
        }
    }

    fn from_value(value: &Value) -> SortKey {
        match value {
            Value::Null => SortKey::Absent,
            Value::Number(number) => NumericKey::from_number(number)
                .map(SortKey::Numeric)
                .unwrap_or(SortKey::Structured),
            Value::String(text) => SortKey::from_text(text),
            Value::Bool(flag) => SortKey::Bool(*flag),
            Value::Array(_) | Value::Object(_) => SortKey::Structured,
        }
    }

    fn from_text(text: &str) -> SortKey {
        if let Some(number) = NumericKey::from_digits(text) {
            return SortKey::Numeric(number);
        }
        if let Some(instant) = parse_calendar_date(text) {
            return SortKey::Date(instant);
        }
        SortKey::Text(text.to_lowercase())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SortKey::Absent)
    }

    /// Compare two keys in the given direction.
    #[inline]
    pub fn compare_with_order(
        &self,
        other: &Self,
        order: SortOrder,
    ) -> Ordering {
        match order {
            SortOrder::Asc => self.cmp(other),
            SortOrder::Desc => other.cmp(self),
        }
    }
}

/// Parse the date shapes tables commonly carry. Naive values are read as UTC.
pub fn parse_calendar_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
        })
        .map(|naive| naive.and_utc())
}

/// Record comparator built from a sort specification.
///
/// Every path shares the one direction; the first path is the primary key.
#[derive(Debug, Clone)]
pub struct Comparator {
    paths: Vec<FieldPath>,
    order: SortOrder,
}

/// Build the comparator for `sort_by` in direction `order`. Empty paths are
/// skipped, so an unsorted `SortBy` yields a comparator that keeps every pair
/// equal.
pub fn build_comparator(sort_by: &SortBy, order: SortOrder) -> Comparator {
    Comparator {
        paths: sort_by
            .paths()
            .iter()
            .filter(|path| !path.is_empty())
            .cloned()
            .collect(),
        order,
    }
}

impl Comparator {
    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// `true` when no path contributes, i.e. every pair compares equal.
    pub fn is_identity(&self) -> bool {
        self.paths.is_empty()
    }

    /// Keys for `record`, one per path.
    pub fn extract_keys(&self, record: &Record) -> Vec<SortKey> {
        self.paths
            .iter()
            .map(|path| SortKey::infer(resolve(record, path)))
            .collect()
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.compare_keys(&self.extract_keys(a), &self.extract_keys(b))
    }

    fn compare_keys(&self, a: &[SortKey], b: &[SortKey]) -> Ordering {
        a.iter()
            .zip(b)
            .map(|(left, right)| left.compare_with_order(right, self.order))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort of a shallow copy of `rows`. Keys are extracted once per
    /// row.
    pub fn sorted(&self, rows: &[RecordRef]) -> Vec<RecordRef> {
        if self.is_identity() {
            return rows.to_vec();
        }

        let mut keyed: Vec<(Vec<SortKey>, &RecordRef)> = rows
            .iter()
            .map(|row| (self.extract_keys(row), row))
            .collect();

        // slice::sort_by is stable
        keyed.sort_by(|a, b| self.compare_keys(&a.0, &b.0));

        keyed.into_iter().map(|(_, row)| RecordRef::clone(row)).collect()
    }
}
