//! Config error-message, atomic-write-safety, and discovery integration tests.

use assert_fs::prelude::*;
use i18nflow_core::{
    config::{self, Config},
    ConfigError,
};
use predicates::prelude::predicate;
use std::fs;

fn complete() -> Config {
    Config {
        api_key: "key-123".into(),
        project_id: "1".into(),
        ..Config::default()
    }
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_points_at_init() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains(".i18nflow.yaml"), "must contain file path, got: {msg}");
    assert!(msg.contains("i18nflow init"), "must direct user to init, got: {msg}");
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(".i18nflow.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(".i18nflow.yaml"));
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(".i18nflow.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");
    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn missing_fields_message_names_each_field() {
    let err = Config::default().validate().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("api_key"), "got: {msg}");
    assert!(msg.contains("project_id"), "got: {msg}");
    assert!(!msg.contains("server_url"), "server_url has a default, got: {msg}");
    assert!(msg.contains("i18nflow init"), "got: {msg}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(root.path(), &complete()).expect("save");

    let path = config::config_path_at(root.path());
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = root.path().join(".i18nflow.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(original_bytes, fs::read(&path).expect("read after crash"));
    let loaded = config::load_at(root.path()).expect("load after crash");
    assert_eq!(loaded, complete());
}

#[test]
fn save_overwrites_previous_config() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(root.path(), &complete()).expect("first save");

    let updated = Config {
        default_locale: "zh".into(),
        ..complete()
    };
    config::save_at(root.path(), &updated).expect("second save");

    root.child(".i18nflow.yaml")
        .assert(predicate::str::contains("default_locale: zh"));
    assert_eq!(config::load_at(root.path()).unwrap(), updated);
}

// ---------------------------------------------------------------------------
// 3. Project root discovery
// ---------------------------------------------------------------------------

#[test]
fn config_file_marks_project_root() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(root.path(), &complete()).expect("save");
    let deep = root.child("src/app/pages");
    deep.create_dir_all().expect("mkdir");

    let found = config::find_project_root_at(deep.path()).expect("root");
    assert_eq!(found, root.path());
}

#[test]
fn nearest_marker_wins() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(root.path(), &complete()).expect("save");
    let package = root.child("packages/web");
    package.create_dir_all().expect("mkdir");
    package.child("package.json").write_str("{}").expect("write");

    let found = config::find_project_root_at(package.path()).expect("root");
    assert_eq!(found, package.path());
}
