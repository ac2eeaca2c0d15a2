use kubequill::config::Config;
use tempfile::TempDir;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert!(!config.strict_units);
    assert_eq!(config.default_ratio_limit, 2);
    assert_eq!(config.output_format, "yaml");
    assert_eq!(config.disallowed_tags, vec!["latest".to_string()]);
}

#[test]
fn test_serialize_default_config() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("Failed to serialize config");

    assert!(toml_str.contains("strict_units = false"));
    assert!(toml_str.contains("default_ratio_limit = 2"));
    assert!(toml_str.contains("output_format = \"yaml\""));
    assert!(toml_str.contains("disallowed_tags = [\"latest\"]"));
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: Config = toml::from_str("strict_units = true\n").unwrap();

    assert!(config.strict_units);
    assert_eq!(config.default_ratio_limit, 2);
    assert_eq!(config.output_format, "yaml");
}

#[test]
fn test_empty_config_is_default() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        strict_units: true,
        default_ratio_limit: 3,
        output_format: "json".to_string(),
        disallowed_tags: vec!["latest".to_string(), "dev".to_string()],
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.is_disallowed_tag("dev"));
}

#[test]
fn test_load_from_reports_bad_files() {
    let dir = TempDir::new().unwrap();
    assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());

    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "default_ratio_limit = \"two\"\n").unwrap();
    let err = Config::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
}
