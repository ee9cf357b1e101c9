//! Common test fixtures and helpers
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::fixture_dir;
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path to a file under `tests/fixtures/`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Temp directory holding copies of the named fixtures
pub fn fixture_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for name in names {
        fs::copy(fixture_path(name), dir.path().join(name)).expect("Failed to copy fixture");
    }
    dir
}

/// Minimal transcript with `n` numbered turns
pub fn transcript(n: usize) -> String {
    let mut html = String::from("<html><body>");
    for i in 1..=n {
        html.push_str(&format!(
            "<user-query><p>question {i}</p></user-query>\
             <model-response><p>answer {i}</p></model-response>"
        ));
    }
    html.push_str("</body></html>");
    html
}
