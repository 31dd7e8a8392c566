//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use timerlab_engine::Settings;

/// Settings with a short delay and budget, for tests that run on real time.
pub fn fast_settings() -> Settings {
    Settings {
        delay: Duration::from_millis(20),
        timeout: Duration::from_millis(200),
        ..Settings::default()
    }
}

/// Write `content` as `config.toml` in a fresh temp dir.
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    (dir, path)
}
