use std::fmt;
use std::sync::Arc;

/// A schemaless row. Values may nest arbitrarily.
pub type Record = serde_json::Value;

/// Shared row handle. Row identity is the allocation, so replacing a row
/// is observable while its contents stay immutable.
pub type RecordRef = Arc<Record>;

/// Dotted path into a [`Record`], e.g. `"address.city"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        FieldPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments in walk order. An empty path has no segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let path = self.0.as_str();
        path.split('.').filter(move |_| !path.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath(path.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        FieldPath(path)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_on_dots() {
        let path = FieldPath::from("address.city.name");
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments, vec!["address", "city", "name"]);
    }

    #[test]
    fn empty_path_has_no_segments() {
        assert_eq!(FieldPath::default().segments().count(), 0);
    }
}
