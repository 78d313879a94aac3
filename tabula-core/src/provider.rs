//! Sortable field paths per logical table.

use std::collections::BTreeMap;

use tabula_model::FieldPath;

/// Supplies the field paths a table may be sorted by.
pub trait SortSpecProvider {
    /// Sortable paths for `table`, in header order. `None` for an unknown
    /// table.
    fn sortable_fields(&self, table: &str) -> Option<&[FieldPath]>;

    fn is_sortable(&self, table: &str, path: &FieldPath) -> bool {
        self.sortable_fields(table)
            .is_some_and(|fields| fields.contains(path))
    }
}

/// In-memory provider, usually filled from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSortFields {
    tables: BTreeMap<String, Vec<FieldPath>>,
}

impl StaticSortFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table<I, P>(
        mut self,
        table: impl Into<String>,
        fields: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.insert(table, fields);
        self
    }

    pub fn insert<I, P>(&mut self, table: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.tables
            .insert(table.into(), fields.into_iter().map(Into::into).collect());
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl SortSpecProvider for StaticSortFields {
    fn sortable_fields(&self, table: &str) -> Option<&[FieldPath]> {
        self.tables.get(table).map(Vec::as_slice)
    }
}
