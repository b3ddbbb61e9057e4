//! Opening a file-backed registry from a project root.

use std::fs;

use tempfile::TempDir;
use threatreg_core::config::ConfigOverrides;
use threatreg_core::types::ComponentType;
use threatreg_registry::Registry;

#[test]
fn test_project_config_selects_database() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("threatreg.toml"),
        "[database]\npath = \"registry.db\"\nread_pool_size = 2\n",
    )
    .unwrap();

    let reg = Registry::open(dir.path(), None).unwrap();
    assert_eq!(reg.db().reader_count(), 2);
    reg.create_component("web", "", ComponentType::Instance).unwrap();
    assert!(dir.path().join("registry.db").exists());
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let overrides = ConfigOverrides {
        database_path: Some("threats.db".to_string()),
        ..Default::default()
    };
    let id = {
        let reg = Registry::open(dir.path(), Some(&overrides)).unwrap();
        let t = reg.create_threat("Persisted", "").unwrap();
        reg.db().checkpoint().unwrap();
        t.id
    };

    let reg = Registry::open(dir.path(), Some(&overrides)).unwrap();
    assert_eq!(reg.get_threat(id).unwrap().title, "Persisted");
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("threatreg.toml"), "[inheritance]\nmax_depth = 0\n").unwrap();
    assert!(Registry::open(dir.path(), None).is_err());
}
