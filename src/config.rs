//! Configuration file support for transcript-md
//!
//! Config files are loaded in order (later overrides earlier):
//! 1. `~/.config/transcript-md/config.toml` (user defaults)
//! 2. `.transcript-md.toml` in the current directory (project overrides)
//!
//! CLI flags override all config file values.

use std::path::Path;

use serde::Deserialize;

use crate::convert::extract::{MODEL_TURN_TAG, USER_TURN_TAG};
use crate::convert::{ConvertError, DocumentOptions, DocumentStyle, TurnExtractor};

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = ".transcript-md.toml";

/// Configuration options loaded from config files
///
/// # Example
///
/// ```toml
/// # ~/.config/transcript-md/config.toml or .transcript-md.toml
/// user_tag = "user-query"          # Element holding a user turn
/// model_tag = "model-response"     # Element holding a model turn
/// user_label = "User"              # Heading for user text
/// assistant_label = "Gemini"       # Heading for model text
/// style = "simple"                 # "full" (default) or "simple"
/// no_clobber = false               # Refuse to replace existing outputs
/// quiet = false
/// verbose = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_tag: Option<String>,
    pub model_tag: Option<String>,
    pub user_label: Option<String>,
    pub assistant_label: Option<String>,
    pub style: Option<DocumentStyle>,
    pub no_clobber: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
}

impl Config {
    /// Load configuration from user and project config files
    pub fn load(project_root: &Path) -> Self {
        let user_config = dirs::config_dir()
            .map(|d| d.join("transcript-md/config.toml"))
            .and_then(|p| Self::load_file(&p))
            .unwrap_or_default();

        let project_config =
            Self::load_file(&project_root.join(PROJECT_CONFIG_FILE)).unwrap_or_default();

        // Project overrides user
        let merged = user_config.override_with(project_config);
        tracing::debug!(
            user_tag = ?merged.user_tag,
            model_tag = ?merged.model_tag,
            style = ?merged.style,
            no_clobber = ?merged.no_clobber,
            "Effective config after merge"
        );
        merged
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                return None;
            }
        };

        match toml::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Layer another config on top (other overrides self where present)
    fn override_with(self, other: Self) -> Self {
        Config {
            user_tag: other.user_tag.or(self.user_tag),
            model_tag: other.model_tag.or(self.model_tag),
            user_label: other.user_label.or(self.user_label),
            assistant_label: other.assistant_label.or(self.assistant_label),
            style: other.style.or(self.style),
            no_clobber: other.no_clobber.or(self.no_clobber),
            quiet: other.quiet.or(self.quiet),
            verbose: other.verbose.or(self.verbose),
        }
    }

    // ===== Accessors with defaults =====

    /// Build the turn extractor for the configured tags.
    pub fn extractor(&self) -> Result<TurnExtractor, ConvertError> {
        TurnExtractor::new(
            self.user_tag.as_deref().unwrap_or(USER_TURN_TAG),
            self.model_tag.as_deref().unwrap_or(MODEL_TURN_TAG),
        )
    }

    /// Document options with configured style and labels.
    pub fn document_options(&self) -> DocumentOptions {
        let defaults = DocumentOptions::default();
        DocumentOptions {
            style: self.style.unwrap_or(defaults.style),
            user_label: self.user_label.clone().unwrap_or(defaults.user_label),
            assistant_label: self
                .assistant_label
                .clone()
                .unwrap_or(defaults.assistant_label),
        }
    }

    pub fn no_clobber_or_default(&self) -> bool {
        self.no_clobber.unwrap_or(false)
    }

    pub fn quiet_or_default(&self) -> bool {
        self.quiet.unwrap_or(false)
    }

    pub fn verbose_or_default(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(
            &path,
            "assistant_label = \"Gemini\"\nstyle = \"simple\"\nno_clobber = true\n",
        )
        .unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.assistant_label.as_deref(), Some("Gemini"));
        assert_eq!(config.style, Some(DocumentStyle::Simple));
        assert!(config.no_clobber_or_default());
        assert!(!config.quiet_or_default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_file(&dir.path().join("absent.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "style = [not valid").unwrap();
        assert!(Config::load_file(&path).is_none());
    }

    #[test]
    fn test_unknown_style_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "style = \"fancy\"").unwrap();
        assert!(Config::load_file(&path).is_none());
    }

    #[test]
    fn test_override_with() {
        let user = Config {
            user_label: Some("Me".into()),
            assistant_label: Some("Bot".into()),
            quiet: Some(true),
            ..Default::default()
        };
        let project = Config {
            assistant_label: Some("Gemini".into()),
            ..Default::default()
        };
        let merged = user.override_with(project);
        assert_eq!(merged.user_label.as_deref(), Some("Me"));
        assert_eq!(merged.assistant_label.as_deref(), Some("Gemini"));
        assert_eq!(merged.quiet, Some(true));
    }

    #[test]
    fn test_document_options_defaults() {
        let opts = Config::default().document_options();
        assert_eq!(opts.style, DocumentStyle::Full);
        assert_eq!(opts.user_label, "User");
        assert_eq!(opts.assistant_label, "Assistant");
    }

    #[test]
    fn test_extractor_from_config() {
        let config = Config {
            user_tag: Some("human-turn".into()),
            ..Default::default()
        };
        let turns = config
            .extractor()
            .unwrap()
            .extract("<human-turn>hi</human-turn><model-response>yo</model-response>");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].user(), Some("hi"));

        let bad = Config {
            model_tag: Some("a[[".into()),
            ..Default::default()
        };
        assert!(bad.extractor().is_err());
    }
}
