use std::fs;

use pdf_launcher::logging::{file_appender, init};
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn appender_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("launcher.log");

    assert!(file_appender(&path).is_ok());
    assert!(path.exists());
}

#[test]
fn appender_under_a_regular_file_is_an_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    assert!(file_appender(&blocker.join("sub").join("launcher.log")).is_err());
}

#[test]
#[serial]
fn uncreatable_log_file_falls_back_to_stderr() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();
    let path = blocker.join("sub").join("launcher.log");

    init(false, Some(path.clone()));
    tracing::info!("still logging after fallback");

    assert!(!path.exists());
}
