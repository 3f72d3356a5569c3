//! Integration tests for logger behavior.

use study_planner::logger::{set_level, set_level_from_str, Level};
use study_planner::{debug, error, info, verbose, warn};

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("WARN"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
}

#[test]
fn logs_do_not_panic() {
    set_level(Level::Debug);
    info!("info integration");
    warn!("warn integration");
    error!("error integration {}", 42);
    debug!("debug integration");
    verbose!("verbose integration");
}

#[cfg(feature = "file-logging")]
#[test]
fn file_logging_creates_parent_directories() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let log_path = temp_dir.path().join("logs").join("studyplan.log");

    assert!(study_planner::logger::init_file_logging(&log_path));
    error!("written to file");

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("[ERROR] written to file"));
}
