use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value;
use tabula_config::{ViewConfig, logging, util::parse_sort_by};
use tabula_core::{Dataset, ViewEngine};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "tabula-view",
    about = "Print one sorted page of a JSON record array"
)]
struct Cli {
    /// JSON file holding an array of records
    data: PathBuf,
    /// View config (TOML or JSON); falls back to $TABULA_CONFIG_PATH and
    /// the default locations
    #[arg(long)]
    config: Option<PathBuf>,
    /// Field path(s) to sort by, comma separated
    #[arg(long)]
    sort_by: Option<String>,
    /// asc or desc
    #[arg(long)]
    order: Option<String>,
    /// Rows per page
    #[arg(long)]
    rows: Option<usize>,
    /// 1-based page to print
    #[arg(long)]
    page: Option<usize>,
}

fn main() -> Result<()> {
    logging::init_tracing("info");

    let cli = Cli::parse();

    let (mut config, source) = ViewConfig::load(cli.config.as_deref())?;
    debug!(?source, "view config loaded");
    if let Some(raw) = &cli.sort_by {
        config.sort_by = parse_sort_by(raw);
    }
    if let Some(order) = &cli.order {
        config.sort_order = order.clone();
    }
    if let Some(rows) = cli.rows {
        config.rows_on_page = rows;
    }
    if let Some(page) = cli.page {
        config.active_page = page;
    }
    config.validate()?;

    let dataset = load_dataset(&cli.data)?;
    info!(rows = dataset.len(), path = %cli.data.display(), "dataset loaded");

    let mut view = ViewEngine::new(dataset, config.to_options())?;
    view.evaluate();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", serde_json::to_string(&view.page())?)?;
    for row in view.slice() {
        writeln!(out, "{}", serde_json::to_string(&**row)?)?;
    }
    Ok(())
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&contents)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    match parsed {
        Value::Array(records) => Ok(records.into()),
        other => bail!(
            "{} must hold a JSON array of records, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
