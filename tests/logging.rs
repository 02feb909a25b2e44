use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("launcher.log");

    pdf_launcher::logging::init(true, Some(path.clone()));
    tracing::info!("opened test document");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("opened test document"));

    // A later init keeps the file subscriber.
    pdf_launcher::logging::init(false, None);
    tracing::info!("still going to the file");
    sleep(Duration::from_millis(100));
    let contents = fs::read_to_string(dir.path().join("launcher.log")).unwrap();
    assert!(contents.contains("still going to the file"));
}
