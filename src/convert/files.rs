//! Input enumeration for batch conversion.
//!
//! A batch pattern is either a glob (`chats/*.html`, `**/*.htm`), a literal
//! file path, or a directory, in which case every HTML file below it is
//! taken.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use super::ConvertError;

/// Extensions picked up when a directory is given instead of a pattern.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Whether `path` has an HTML extension (case-insensitive).
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| HTML_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand a batch pattern into a sorted list of files.
///
/// No match is not an error; an invalid glob is.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, ConvertError> {
    let _span = tracing::info_span!("expand_pattern", pattern).entered();

    let mut files = if !pattern.contains(GLOB_META) {
        expand_literal(Path::new(pattern))
    } else {
        expand_glob(pattern)?
    };
    files.sort();
    files.dedup();

    tracing::info!(matched = files.len(), "Pattern expanded");
    Ok(files)
}

fn expand_literal(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        walk_files(path, None)
            .filter(|p| is_html_file(p))
            .collect()
    } else {
        Vec::new()
    }
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, ConvertError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ConvertError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let (base, glob_depth) = split_base(pattern);
    let walk_root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };
    if !walk_root.is_dir() {
        return Ok(Vec::new());
    }

    // `**` can match any depth; otherwise the pattern fixes it.
    let max_depth = if pattern.contains("**") {
        None
    } else {
        Some(glob_depth)
    };

    let files = walk_files(&walk_root, max_depth)
        .filter(|path| {
            // Relative patterns without a base are matched against
            // paths without the leading `./` the walk adds.
            let candidate = if base.as_os_str().is_empty() {
                path.strip_prefix(".").unwrap_or(path)
            } else {
                path.as_path()
            };
            matcher.is_match(candidate)
        })
        .collect();
    Ok(files)
}

/// Split a glob into its literal leading directory and the number of
/// path components after it.
fn split_base(pattern: &str) -> (PathBuf, usize) {
    let path = Path::new(pattern);
    let mut base = PathBuf::new();
    let mut rest = 0;
    let mut in_glob = false;
    for component in path.components() {
        let has_meta = matches!(component, Component::Normal(c) if c.to_string_lossy().contains(GLOB_META));
        if in_glob || has_meta {
            in_glob = true;
            rest += 1;
        } else {
            base.push(component);
        }
    }
    (base, rest)
}

/// Regular files under `root`, skipping symlinks.
fn walk_files(root: &Path, max_depth: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut walker = WalkDir::new(root).follow_links(false);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }
    walker
        .into_iter()
        .filter_entry(|e| !e.path_is_symlink())
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
}
