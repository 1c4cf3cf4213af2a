use defquill::config::Config;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_all_default_values() {
    let config = Config::default();

    assert_eq!(config.archive, None);
    assert_eq!(config.max_results_shown, 5);
    assert_eq!(config.summary_chars, 100);
    assert_eq!(config.max_chain_depth, 64);
    assert_eq!(config.max_visited_nodes, 1_000_000);
    assert_eq!(config.log_filter, "warn");
}

#[test]
fn test_partial_file_uses_defaults_for_the_rest() {
    let config: Config = toml::from_str(
        r#"
        archive = "/srv/defs/Core.zip"
        summary_chars = 60
        "#,
    )
    .expect("Failed to parse config");

    assert_eq!(config.archive, Some(PathBuf::from("/srv/defs/Core.zip")));
    assert_eq!(config.summary_chars, 60);
    assert_eq!(config.max_results_shown, 5);
    assert_eq!(config.log_filter, "warn");
}

#[test]
fn test_serialize_default_config() {
    let toml_str = toml::to_string(&Config::default()).expect("Failed to serialize config");

    assert!(toml_str.contains("max_results_shown = 5"));
    assert!(toml_str.contains("summary_chars = 100"));
    assert!(toml_str.contains("max_chain_depth = 64"));
    assert!(toml_str.contains("max_visited_nodes = 1000000"));
    assert!(toml_str.contains("log_filter = \"warn\""));
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        archive: Some(PathBuf::from("Core.zip")),
        max_chain_depth: 8,
        log_filter: "defquill=debug".to_string(),
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_load_from_reports_bad_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read config"));

    std::fs::write(&path, "max_results_shown = \"lots\"").unwrap();
    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().starts_with("Invalid config"));
}
