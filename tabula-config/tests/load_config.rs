use std::{fs, sync::Mutex};

use tabula_config::{ViewConfig, ViewConfigSource};
use tabula_core::{Dataset, SortIndicator, SortToggle, ViewEngine};
use tabula_model::{SortBy, SortOrder};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const ENV_KEYS: &[&str] = &[
    "TABULA_CONFIG_PATH",
    "TABULA_CONFIG_JSON",
    "TABULA_SORT_BY",
    "TABULA_SORT_ORDER",
    "TABULA_ROWS_ON_PAGE",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn loads_toml_and_json_files_by_extension() {
    let dir = tempdir().expect("tempdir");

    let toml_path = dir.path().join("view.toml");
    fs::write(
        &toml_path,
        "sort_by = \"name\"\nsort_order = \"desc\"\nrows_on_page = 20\n",
    )
    .unwrap();
    let from_toml = ViewConfig::load_from_file(&toml_path).unwrap();
    assert_eq!(from_toml.sort_by, SortBy::from("name"));
    assert_eq!(from_toml.rows_on_page, 20);

    let json_path = dir.path().join("view.json");
    fs::write(&json_path, r#"{"sort_by": ["a", "b"], "active_page": 3}"#)
        .unwrap();
    let from_json = ViewConfig::load_from_file(&json_path).unwrap();
    assert_eq!(from_json.sort_by, SortBy::multi(["a", "b"]));
    assert_eq!(from_json.active_page, 3);

    let missing = dir.path().join("missing.toml");
    let err = ViewConfig::load_from_file(&missing).unwrap_err();
    assert!(err.to_string().contains("cannot open view config"));

    // unknown extension: the contents decide
    let bare_path = dir.path().join("view.conf");
    fs::write(&bare_path, r#"{"rows_on_page": 4}"#).unwrap();
    let from_bare = ViewConfig::load_from_file(&bare_path).unwrap();
    assert_eq!(from_bare.rows_on_page, 4);
}

#[test]
fn env_sources_and_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tabula.toml");
    fs::write(
        &path,
        "rows_on_page = 15\n[tables.inventory]\nsort_fields = [\"placeId\"]\n",
    )
    .unwrap();

    unsafe { std::env::set_var("TABULA_CONFIG_PATH", &path) };
    let (config, source) = ViewConfig::load_from_env().unwrap();
    assert_eq!(source, ViewConfigSource::EnvPath(path.clone()));
    assert_eq!(config.rows_on_page, 15);
    assert!(config.tables.contains_key("inventory"));

    unsafe { std::env::remove_var("TABULA_CONFIG_PATH") };
    let inline = r#"{"rows_on_page": 7}"#;
    unsafe { std::env::set_var("TABULA_CONFIG_JSON", inline) };
    unsafe { std::env::set_var("TABULA_SORT_BY", "city,name") };
    unsafe { std::env::set_var("TABULA_SORT_ORDER", "desc") };
    unsafe { std::env::set_var("TABULA_ROWS_ON_PAGE", "0") };
    let (config, source) = ViewConfig::load_from_env().unwrap();
    assert_eq!(source, ViewConfigSource::EnvInline);
    // zero is ignored, the inline value stays
    assert_eq!(config.rows_on_page, 7);
    assert_eq!(config.sort_by, SortBy::multi(["city", "name"]));
    assert_eq!(config.sort_order, "desc");

    let invalid = r#"{"rows_on_page": 0}"#;
    unsafe { std::env::set_var("TABULA_CONFIG_JSON", invalid) };
    unsafe { std::env::remove_var("TABULA_ROWS_ON_PAGE") };
    assert!(ViewConfig::load_from_env().is_err());

    // an explicit file outranks the inline JSON; overrides still apply
    let explicit = dir.path().join("explicit.json");
    fs::write(&explicit, r#"{"rows_on_page": 3, "sort_by": "id"}"#).unwrap();
    let (config, source) = ViewConfig::load(Some(explicit.as_path())).unwrap();
    assert_eq!(source, ViewConfigSource::File(explicit.clone()));
    assert_eq!(config.rows_on_page, 3);
    assert_eq!(config.sort_by, SortBy::multi(["city", "name"]));

    clear_env();
}

#[test]
fn config_drives_engine_and_toggles() {
    let config = ViewConfig::parse(
        r#"
sort_by = "placeName"
sort_order = "desc"
rows_on_page = 2

[tables.inventory]
sort_fields = ["placeId", "placeName"]
"#,
        None,
    )
    .unwrap();

    let dataset: Dataset = vec![
        serde_json::json!({"placeId": "3", "placeName": "Cedar"}),
        serde_json::json!({"placeId": "10", "placeName": "alder"}),
        serde_json::json!({"placeId": "7", "placeName": "Birch"}),
    ]
    .into();
    let mut view = ViewEngine::new(dataset, config.to_options()).unwrap();
    view.evaluate();
    let names: Vec<_> = view
        .slice()
        .iter()
        .map(|row| row["placeName"].clone())
        .collect();
    assert_eq!(names, vec!["Cedar", "Birch"]);

    let provider = config.sort_fields();
    let mut toggles = SortToggle::for_table(&provider, "inventory", &view);
    assert_eq!(toggles.len(), 2);
    assert_eq!(toggles[0].indicator(), SortIndicator::Unsorted);
    assert_eq!(toggles[1].indicator(), SortIndicator::Descending);

    toggles[0].activate(&mut view);
    assert_eq!(view.sort_order(), SortOrder::Asc);
    view.evaluate();
    let ids: Vec<_> = view
        .slice()
        .iter()
        .map(|row| row["placeId"].clone())
        .collect();
    assert_eq!(ids, vec!["3", "7"]);
}
