//! Document titles and output paths derived from input file names.

use std::path::{Path, PathBuf};

/// Extension of every generated file.
pub const OUTPUT_EXTENSION: &str = "md";

/// Derive a document title from the input file name.
///
/// The stem has `-` and `_` replaced by spaces and is then title-cased:
/// a letter is uppercased when it does not follow another letter, and
/// lowercased otherwise.
///
/// # Examples
///
/// ```
/// use transcript_md::convert::naming::title_from_path;
/// use std::path::Path;
/// assert_eq!(title_from_path(Path::new("chats/hair-density.html")), "Hair Density");
/// assert_eq!(title_from_path(Path::new("rust_BORROW_checker.htm")), "Rust Borrow Checker");
/// ```
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let spaced = stem.replace(['-', '_'], " ");
    title_case(&spaced)
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// `{stem}.md` beside the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// `{dir}/{stem}.md` for batch runs redirected to one directory.
pub fn output_path_in(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    dir.join(format!("{stem}.{OUTPUT_EXTENSION}"))
}
