use std::fmt;
use std::slice;

use crate::record::FieldPath;

/// Sort direction, applied uniformly to every path of a [`SortBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Strict parse of `"asc"` / `"desc"`.
    pub fn parse(raw: &str) -> Option<SortOrder> {
        match raw {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// Coerces anything that is not `"asc"` or `"desc"` to [`SortOrder::Asc`].
    /// The flag is `true` when coercion happened.
    pub fn normalize(raw: &str) -> (SortOrder, bool) {
        match SortOrder::parse(raw) {
            Some(order) => (order, false),
            None => (SortOrder::Asc, true),
        }
    }

    pub fn opposite(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn is_desc(self) -> bool {
        matches!(self, SortOrder::Desc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field path or an ordered list of them. The first path is the
/// primary key; later paths break ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SortBy {
    Single(FieldPath),
    Multi(Vec<FieldPath>),
}

impl SortBy {
    pub fn single(path: impl Into<FieldPath>) -> Self {
        SortBy::Single(path.into())
    }

    pub fn multi<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        SortBy::Multi(paths.into_iter().map(Into::into).collect())
    }

    /// Paths in precedence order.
    pub fn paths(&self) -> &[FieldPath] {
        match self {
            SortBy::Single(path) => slice::from_ref(path),
            SortBy::Multi(paths) => paths,
        }
    }

    /// No usable path: the dataset order is kept as-is.
    pub fn is_unsorted(&self) -> bool {
        self.paths().iter().all(FieldPath::is_empty)
    }

    /// `true` only for a single-path sort on exactly `path`.
    pub fn is_single(&self, path: &FieldPath) -> bool {
        matches!(self, SortBy::Single(current) if current == path)
    }
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Single(FieldPath::default())
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Single(path) => write!(f, "{path}"),
            SortBy::Multi(paths) => {
                let joined: Vec<&str> =
                    paths.iter().map(FieldPath::as_str).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

impl From<&str> for SortBy {
    fn from(path: &str) -> Self {
        SortBy::Single(path.into())
    }
}

impl From<String> for SortBy {
    fn from(path: String) -> Self {
        SortBy::Single(path.into())
    }
}

impl From<FieldPath> for SortBy {
    fn from(path: FieldPath) -> Self {
        SortBy::Single(path)
    }
}

impl From<Vec<FieldPath>> for SortBy {
    fn from(paths: Vec<FieldPath>) -> Self {
        SortBy::Multi(paths)
    }
}

impl From<Vec<&str>> for SortBy {
    fn from(paths: Vec<&str>) -> Self {
        SortBy::multi(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_coerces_unknown_orders() {
        assert_eq!(SortOrder::normalize("desc"), (SortOrder::Desc, false));
        assert_eq!(SortOrder::normalize("asc"), (SortOrder::Asc, false));
        assert_eq!(SortOrder::normalize("DESC"), (SortOrder::Asc, true));
        assert_eq!(SortOrder::normalize(""), (SortOrder::Asc, true));
    }

    #[test]
    fn default_sort_is_unsorted() {
        assert!(SortBy::default().is_unsorted());
        assert!(SortBy::Multi(vec![]).is_unsorted());
        assert!(!SortBy::from("name").is_unsorted());
    }

    #[test]
    fn is_single_ignores_multi_paths() {
        let name = FieldPath::from("name");
        assert!(SortBy::from("name").is_single(&name));
        assert!(!SortBy::from(vec!["name"]).is_single(&name));
    }
}
