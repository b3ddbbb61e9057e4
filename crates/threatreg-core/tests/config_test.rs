//! Tests for the registry configuration system.

use std::sync::Mutex;

use threatreg_core::config::registry_config::{ConfigOverrides, RegistryConfig};
use threatreg_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all THREATREG_ env vars to prevent cross-test contamination.
fn clear_env_vars() {
    for key in [
        "THREATREG_DATABASE_PATH",
        "THREATREG_DATABASE_READ_POOL_SIZE",
        "THREATREG_DATABASE_BUSY_TIMEOUT_MS",
        "THREATREG_INHERITANCE_MAX_DEPTH",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("threatreg.toml"),
        r#"
[database]
path = "project.db"
read_pool_size = 2

[inheritance]
max_depth = 20
"#,
    )
    .unwrap();

    std::env::set_var("THREATREG_DATABASE_READ_POOL_SIZE", "6");

    let overrides = ConfigOverrides {
        max_depth: Some(7),
        ..Default::default()
    };

    let config = RegistryConfig::load(dir.path(), Some(&overrides)).unwrap();

    // Project file wins over defaults
    assert_eq!(config.database.effective_path(), "project.db");
    // Env wins over project file
    assert_eq!(config.database.read_pool_size, Some(6));
    // Overrides win over everything
    assert_eq!(config.inheritance.effective_max_depth(), 7);

    clear_env_vars();
}

#[test]
fn test_load_missing_files_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    let config = RegistryConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.database.effective_read_pool_size(), 4);
    assert_eq!(config.database.effective_busy_timeout_ms(), 5000);
    assert_eq!(config.inheritance.effective_max_depth(), 100);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("threatreg.toml"), "[database\npath = ").unwrap();

    let err = RegistryConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "got {err:?}");
}

#[test]
fn test_validation_rejects_pool_size_out_of_range() {
    let config = RegistryConfig::from_toml("[database]\nread_pool_size = 9\n").unwrap();
    let err = RegistryConfig::validate(&config).unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "database.read_pool_size")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let config = RegistryConfig::from_toml("[database]\nread_pool_size = 0\n").unwrap();
    assert!(RegistryConfig::validate(&config).is_err());
}

#[test]
fn test_validation_rejects_zero_depth_and_empty_path() {
    let config = RegistryConfig::from_toml("[inheritance]\nmax_depth = 0\n").unwrap();
    assert!(RegistryConfig::validate(&config).is_err());

    let config = RegistryConfig::from_toml("[database]\npath = \"  \"\n").unwrap();
    assert!(RegistryConfig::validate(&config).is_err());
}

#[test]
fn test_unparseable_env_value_is_invalid_value() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    std::env::set_var("THREATREG_INHERITANCE_MAX_DEPTH", "deep");
    let dir = tempdir();
    let err = RegistryConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }), "got {err:?}");

    clear_env_vars();
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = RegistryConfig::from_toml(
        r#"
[database]
path = "x.db"
future_option = true

[something_new]
value = 1
"#,
    )
    .unwrap();
    assert_eq!(config.database.effective_path(), "x.db");
}

#[test]
fn test_to_toml_round_trips() {
    let config = RegistryConfig::from_toml("[database]\npath = \"r.db\"\n").unwrap();
    let text = config.to_toml().unwrap();
    let back = RegistryConfig::from_toml(&text).unwrap();
    assert_eq!(back.database.path.as_deref(), Some("r.db"));
}
