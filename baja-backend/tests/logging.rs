//! Installs the global subscriber, so it lives in its own test binary.

use std::fs;
use tempfile::TempDir;

use baja_backend::logging::init_logging;

#[tokio::test]
async fn invalid_level_warning_reaches_the_log_file() {
    let dir = TempDir::new().unwrap();

    let guard = init_logging(dir.path(), "baja-test", "loud").unwrap();
    tracing::info!("still logging at info");
    // Flushes the non-blocking writer
    drop(guard);

    let contents: String = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .map(|path| fs::read_to_string(path).unwrap())
        .collect();

    assert!(
        contents.contains("Invalid log level 'loud', defaulting to 'info'"),
        "{}",
        contents
    );
    assert!(contents.contains("still logging at info"));
}
