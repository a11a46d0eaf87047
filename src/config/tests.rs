use super::AppConfig;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[test]
fn defaults_are_unarmed_and_quiet() {
    let cfg = AppConfig::parse_from(["test-app"]);
    assert!(!cfg.arm);
    assert!(cfg.log_file.is_none());
    assert!(!cfg.logging_enabled());
    assert!(!cfg.log_content);
}

#[test]
fn accepts_log_file_in_missing_folder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("new").join("log.csv");
    let mut cfg =
        AppConfig::parse_from(["test-app", "--log-file", target.to_str().expect("utf8")]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.log_file, Some(target));
}

#[test]
fn rejects_log_file_that_is_a_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--log-file",
        dir.path().to_str().expect("utf8"),
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_empty_log_file() {
    assert!(AppConfig::try_parse_from(["test-app", "--log-file", ""]).is_err());
}

#[test]
fn rejects_documents_dir_that_is_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("plain");
    fs::write(&file, "x").expect("seed");
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--documents-dir",
        file.to_str().expect("utf8"),
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn documents_dir_overrides_home() {
    let cfg = AppConfig::parse_from(["test-app", "--documents-dir", "/srv/docs"]);
    assert_eq!(cfg.documents_root(), PathBuf::from("/srv/docs"));
}

#[test]
fn no_logs_overrides_other_log_flags() {
    let mut cfg = AppConfig::parse_from(["test-app", "--logs", "--log-content", "--no-logs"]);
    assert!(cfg.validate().is_ok());
    assert!(!cfg.logging_enabled());
    assert!(!cfg.log_content);
}
