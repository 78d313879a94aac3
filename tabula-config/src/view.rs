use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};
use tabula_core::{StaticSortFields, ViewOptions, streams};
use tabula_model::{
    DEFAULT_ACTIVE_PAGE, DEFAULT_ROWS_ON_PAGE, FieldPath, PageSpec, SortBy,
    SortOrder,
};
use tracing::warn;

use crate::util::{parse_positive, parse_sort_by};

pub const CONFIG_PATH_VAR: &str = "TABULA_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "TABULA_CONFIG_JSON";
pub const SORT_BY_VAR: &str = "TABULA_SORT_BY";
pub const SORT_ORDER_VAR: &str = "TABULA_SORT_ORDER";
pub const ROWS_ON_PAGE_VAR: &str = "TABULA_ROWS_ON_PAGE";

/// Where the view configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewConfigSource {
    /// Nothing configured; built-in values.
    #[default]
    Default,
    /// File named by `$TABULA_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// JSON held in `$TABULA_CONFIG_JSON`.
    EnvInline,
    /// A file passed explicitly or found at a default location.
    File(PathBuf),
}

const DEFAULT_LOCATIONS: &[&str] = &[
    "tabula.toml",
    "tabula.json",
    "config/tabula.toml",
    "config/tabula.json",
];

impl ViewConfigSource {
    /// Pick the source without reading it. `explicit` wins, then
    /// `$TABULA_CONFIG_PATH`, then `$TABULA_CONFIG_JSON`, then the first
    /// default location that exists.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::File(path.to_path_buf());
        }
        if let Some(path) = non_blank_var(CONFIG_PATH_VAR) {
            return Self::EnvPath(PathBuf::from(path));
        }
        if non_blank_var(CONFIG_JSON_VAR).is_some() {
            return Self::EnvInline;
        }
        DEFAULT_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
            .map_or(Self::Default, Self::File)
    }

    /// Read the configuration this source points at.
    pub fn read(&self) -> anyhow::Result<ViewConfig> {
        match self {
            Self::Default => Ok(ViewConfig::default()),
            Self::EnvPath(path) | Self::File(path) => {
                ViewConfig::load_from_file(path)
            }
            Self::EnvInline => {
                let raw = non_blank_var(CONFIG_JSON_VAR).unwrap_or_default();
                ViewConfig::parse(&raw, Some(ConfigFormat::Json)).with_context(
                    || format!("{CONFIG_JSON_VAR} is not usable"),
                )
            }
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Serialization a configuration document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format implied by a file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "toml" | "tml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// JSON documents are objects; anything else is read as TOML.
    fn sniff(contents: &str) -> Self {
        if contents.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Toml
        }
    }
}

/// Per-table settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    /// Field paths offered as sortable headers, in display order.
    pub sort_fields: Vec<FieldPath>,
}

/// Initial view state plus the table registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// One path (`"name"`) or a list (`["city", "name"]`). Empty keeps the
    /// dataset order.
    pub sort_by: SortBy,
    /// `asc` or `desc`; anything else falls back to `asc` with a warning
    /// when the engine starts.
    pub sort_order: String,
    /// Rows per page. Must be positive.
    pub rows_on_page: usize,
    /// 1-based page shown first. Clamped to the page count at startup.
    pub active_page: usize,
    /// Page events buffered per subscriber before a slow subscriber starts
    /// skipping.
    pub page_event_capacity: usize,
    pub tables: BTreeMap<String, TableConfig>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sort_by: SortBy::default(),
            sort_order: SortOrder::Asc.to_string(),
            rows_on_page: DEFAULT_ROWS_ON_PAGE,
            active_page: DEFAULT_ACTIVE_PAGE,
            page_event_capacity: streams::DEFAULT_PAGE_EVENT_CAPACITY,
            tables: BTreeMap::new(),
        }
    }
}

impl ViewConfig {
    /// Resolve the source (see [`ViewConfigSource::resolve`]), read it,
    /// layer the scalar environment overrides on top and validate.
    pub fn load(
        explicit: Option<&Path>,
    ) -> anyhow::Result<(Self, ViewConfigSource)> {
        let source = ViewConfigSource::resolve(explicit);
        let mut config = source.read()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok((config, source))
    }

    /// [`load`](Self::load) with no explicit file.
    pub fn load_from_env() -> anyhow::Result<(Self, ViewConfigSource)> {
        Self::load(None)
    }

    /// Read one file. The extension picks the format; without one the
    /// contents decide.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("cannot open view config {}", path.display())
        })?;
        Self::parse(&contents, ConfigFormat::from_path(path))
            .with_context(|| format!("in view config {}", path.display()))
    }

    /// Parse a document. `None` guesses the format from the contents.
    pub fn parse(
        contents: &str,
        format: Option<ConfigFormat>,
    ) -> anyhow::Result<Self> {
        match format.unwrap_or_else(|| ConfigFormat::sniff(contents)) {
            ConfigFormat::Toml => toml::from_str(contents)
                .map_err(|err| anyhow!("malformed TOML: {err}")),
            ConfigFormat::Json => serde_json::from_str(contents)
                .map_err(|err| anyhow!("malformed JSON: {err}")),
        }
    }

    /// Apply `$TABULA_SORT_BY`, `$TABULA_SORT_ORDER` and
    /// `$TABULA_ROWS_ON_PAGE` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(SORT_BY_VAR) {
            self.sort_by = parse_sort_by(&raw);
        }
        if let Ok(raw) = env::var(SORT_ORDER_VAR)
            && !raw.trim().is_empty()
        {
            self.sort_order = raw.trim().to_string();
        }
        if let Ok(raw) = env::var(ROWS_ON_PAGE_VAR) {
            match parse_positive(&raw) {
                Some(rows) => self.rows_on_page = rows,
                None => warn!(
                    value = raw.as_str(),
                    "{ROWS_ON_PAGE_VAR} must be a positive integer; ignoring"
                ),
            }
        }
    }

    /// Reject values the engine would refuse.
    pub fn validate(&self) -> anyhow::Result<()> {
        PageSpec::new(self.active_page, self.rows_on_page)
            .map_err(|err| anyhow!("invalid view config: {err}"))?;
        if !streams::page_event_capacity_in_range(self.page_event_capacity) {
            return Err(anyhow!(
                "invalid view config: page_event_capacity must be between 1 \
                 and {}, got {}",
                streams::MAX_PAGE_EVENT_CAPACITY,
                self.page_event_capacity
            ));
        }
        Ok(())
    }

    pub fn to_options(&self) -> ViewOptions {
        ViewOptions {
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.clone(),
            active_page: self.active_page,
            rows_on_page: self.rows_on_page,
            page_event_capacity: self.page_event_capacity,
        }
    }

    /// Sortable-field registry built from `tables`.
    pub fn sort_fields(&self) -> StaticSortFields {
        let mut provider = StaticSortFields::new();
        for (table, config) in &self.tables {
            provider.insert(table.clone(), config.sort_fields.iter().cloned());
        }
        provider
    }
}
