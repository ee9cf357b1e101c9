//! Transcript-to-Markdown conversion pipeline.
//!
//! Converts a saved chat transcript (HTML with paired user-turn and
//! model-turn elements) into a readable Markdown document.
//!
//! ## Pipeline
//!
//! 1. Read the HTML file (lossy UTF-8)
//! 2. Extract turns and convert each turn element to Markdown ([`extract`], [`html`])
//! 3. Assemble the document with title and turn headings ([`document`])
//! 4. Write `{stem}.md`, guarding against overwriting the source

pub mod cleaning;
pub mod document;
pub mod extract;
pub mod files;
pub mod html;
pub mod naming;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use document::{assemble, render_document, DocumentOptions, DocumentStyle};
pub use extract::{extract_turns, ConversationTurn, TurnExtractor};
pub use html::{element_to_markdown, html_to_markdown};

/// Errors from converting transcript files.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input file or pattern does not exist
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    /// HTML parsed but held no user or model turns
    #[error("No conversation found in {}", .0.display())]
    NoConversationFound(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Output path could not be created or written
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Output would overwrite source file: {}", .0.display())]
    OverwritesSource(PathBuf),
    #[error("Output file already exists: {} (drop --no-clobber to replace)", .0.display())]
    OutputExists(PathBuf),
    /// Two batch inputs map to one output file; the later input is skipped
    #[error(
        "Skipped {}: output {} is already written by {}",
        .input.display(),
        .output.display(),
        .first.display()
    )]
    DuplicateOutput {
        input: PathBuf,
        output: PathBuf,
        first: PathBuf,
    },
    /// Turn tag is not a usable element selector
    #[error("Invalid turn tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Options controlling the conversion pipeline.
pub struct ConvertOptions {
    pub extractor: TurnExtractor,
    pub document: DocumentOptions,
    /// Overrides the title derived from the input file name.
    pub title: Option<String>,
    /// Fail instead of replacing an existing output file.
    pub no_clobber: bool,
    pub dry_run: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            extractor: TurnExtractor::default(),
            document: DocumentOptions::default(),
            title: None,
            no_clobber: false,
            dry_run: false,
        }
    }
}

/// Result of converting a single transcript.
#[derive(Debug)]
pub struct ConvertResult {
    pub source: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub turns: usize,
}

/// Convert HTML text to a Markdown document without touching the
/// filesystem. Returns the document and the number of turns found.
pub fn convert_html(html: &str, title: &str, opts: &ConvertOptions) -> (String, usize) {
    let turns = opts.extractor.extract(html);
    let markdown = render_document(&turns, title, &opts.document);
    (markdown, turns.len())
}

/// Convert one transcript file.
///
/// `output` defaults to `{stem}.md` beside the input. A transcript with no
/// turns is reported as [`ConvertError::NoConversationFound`] and nothing
/// is written.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    opts: &ConvertOptions,
) -> Result<ConvertResult, ConvertError> {
    let _span = tracing::info_span!("convert_file", path = %input.display()).entered();

    if !input.is_file() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }
    let bytes = std::fs::read(input).map_err(|source| ConvertError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);

    let title = opts
        .title
        .clone()
        .unwrap_or_else(|| naming::title_from_path(input));
    let (markdown, turns) = convert_html(&html, &title, opts);
    if turns == 0 {
        tracing::warn!(path = %input.display(), "No conversation turns found");
        return Err(ConvertError::NoConversationFound(input.to_path_buf()));
    }

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| naming::default_output_path(input));
    finalize_output(input, &output_path, &markdown, opts)?;

    Ok(ConvertResult {
        source: input.to_path_buf(),
        output: output_path,
        title,
        turns,
    })
}

/// Write the document with the source and no-clobber guards.
fn finalize_output(
    source: &Path,
    output_path: &Path,
    markdown: &str,
    opts: &ConvertOptions,
) -> Result<(), ConvertError> {
    if opts.dry_run {
        tracing::info!(output = %output_path.display(), "Dry run, not writing");
        return Ok(());
    }

    let write_err = |source: std::io::Error| ConvertError::WriteFailure {
        path: output_path.to_path_buf(),
        source,
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    // Guard: don't overwrite the source file
    if let (Ok(src), Ok(dst)) = (
        dunce::canonicalize(source),
        dunce::canonicalize(output_path),
    ) {
        if src == dst {
            tracing::warn!(path = %source.display(), "Skipping: output would overwrite source");
            return Err(ConvertError::OverwritesSource(source.to_path_buf()));
        }
    }

    if opts.no_clobber {
        // Atomic create, avoids a race between an exists() check and the write
        use std::io::Write;
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(output_path)
        {
            Ok(mut f) => f.write_all(markdown.as_bytes()).map_err(write_err)?,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ConvertError::OutputExists(output_path.to_path_buf()));
            }
            Err(e) => return Err(write_err(e)),
        }
    } else {
        std::fs::write(output_path, markdown).map_err(write_err)?;
    }

    tracing::info!(
        source = %source.display(),
        output = %output_path.display(),
        bytes = markdown.len(),
        "Converted transcript"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<html><body>\
        <user-query>Hello <b>world</b></user-query>\
        <model-response>Hi!</model-response>\
        </body></html>";

    #[test]
    fn test_convert_html_counts_turns() {
        let (md, turns) = convert_html(SAMPLE, "Demo", &ConvertOptions::default());
        assert_eq!(turns, 1);
        assert!(md.starts_with("# Demo\n\n## Turn 1\n"));
        assert!(md.contains("### User\nHello **world**\n"));
    }

    #[test]
    fn test_convert_file_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hair-density.html");
        std::fs::write(&input, SAMPLE).unwrap();

        let result = convert_file(&input, None, &ConvertOptions::default()).unwrap();
        assert_eq!(result.output, dir.path().join("hair-density.md"));
        assert_eq!(result.title, "Hair Density");
        assert_eq!(result.turns, 1);
        let written = std::fs::read_to_string(&result.output).unwrap();
        assert!(written.starts_with("# Hair Density\n"));
    }

    #[test]
    fn test_convert_file_title_override_and_explicit_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.html");
        std::fs::write(&input, SAMPLE).unwrap();
        let output = dir.path().join("nested/out/custom.md");

        let opts = ConvertOptions {
            title: Some("My Title".to_string()),
            ..Default::default()
        };
        let result = convert_file(&input, Some(&output), &opts).unwrap();
        assert_eq!(result.output, output);
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .starts_with("# My Title\n"));
    }

    #[test]
    fn test_convert_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_file(&dir.path().join("nope.html"), None, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound(_)));
    }

    #[test]
    fn test_convert_file_no_conversation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.html");
        std::fs::write(&input, "<html><body><p>nothing</p></body></html>").unwrap();

        let err = convert_file(&input, None, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::NoConversationFound(_)));
        assert!(!dir.path().join("empty.md").exists());
    }

    #[test]
    fn test_convert_file_refuses_to_overwrite_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.md");
        std::fs::write(&input, SAMPLE).unwrap();

        let err = convert_file(&input, None, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::OverwritesSource(_)));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), SAMPLE);
    }

    #[test]
    fn test_no_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.html");
        std::fs::write(&input, SAMPLE).unwrap();
        std::fs::write(dir.path().join("chat.md"), "keep me").unwrap();

        let opts = ConvertOptions {
            no_clobber: true,
            ..Default::default()
        };
        let err = convert_file(&input, None, &opts).unwrap_err();
        assert!(matches!(err, ConvertError::OutputExists(_)));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("chat.md")).unwrap(),
            "keep me"
        );

        // Default mode replaces it
        convert_file(&input, None, &ConvertOptions::default()).unwrap();
        assert!(std::fs::read_to_string(dir.path().join("chat.md"))
            .unwrap()
            .starts_with("# Chat\n"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.html");
        std::fs::write(&input, SAMPLE).unwrap();

        let opts = ConvertOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = convert_file(&input, None, &opts).unwrap();
        assert_eq!(result.turns, 1);
        assert!(!result.output.exists());
    }

    #[test]
    fn test_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.html");
        std::fs::write(&input, SAMPLE).unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = convert_file(&input, Some(&blocker.join("out.md")), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::WriteFailure { .. }));
    }
}
