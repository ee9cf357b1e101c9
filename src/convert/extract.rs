//! Conversation turn extraction.
//!
//! Finds the user-turn and model-turn elements of a saved transcript and
//! pairs them by position: the i-th user turn goes with the i-th model
//! turn. Unbalanced transcripts degrade to half-filled turns rather than
//! failing.

use scraper::{Html, Selector};

use super::html::element_to_markdown;
use super::ConvertError;

/// Element name of a user turn in exported transcripts.
pub const USER_TURN_TAG: &str = "user-query";

/// Element name of a model turn in exported transcripts.
pub const MODEL_TURN_TAG: &str = "model-response";

/// One positional pair of user and assistant text.
///
/// At least one side is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    user: Option<String>,
    assistant: Option<String>,
}

impl ConversationTurn {
    /// Build a turn, or `None` when both sides are absent.
    pub fn new(user: Option<String>, assistant: Option<String>) -> Option<Self> {
        if user.is_none() && assistant.is_none() {
            return None;
        }
        Some(Self { user, assistant })
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn assistant(&self) -> Option<&str> {
        self.assistant.as_deref()
    }
}

/// Extracts conversation turns using a pair of element selectors.
pub struct TurnExtractor {
    user: Selector,
    model: Selector,
}

impl TurnExtractor {
    /// Build an extractor for the given user/model element names.
    ///
    /// Returns [`ConvertError::InvalidTag`] if a name is not a valid CSS
    /// type selector.
    pub fn new(user_tag: &str, model_tag: &str) -> Result<Self, ConvertError> {
        Ok(Self {
            user: parse_selector(user_tag)?,
            model: parse_selector(model_tag)?,
        })
    }

    /// Extract all turns from an HTML document, in document order.
    pub fn extract(&self, html: &str) -> Vec<ConversationTurn> {
        let _span = tracing::info_span!("extract_turns", bytes = html.len()).entered();

        let document = Html::parse_document(html);
        let users: Vec<_> = document.select(&self.user).collect();
        let models: Vec<_> = document.select(&self.model).collect();

        if users.len() != models.len() {
            tracing::debug!(
                users = users.len(),
                models = models.len(),
                "Unbalanced transcript, pairing by position"
            );
        }

        let turns: Vec<ConversationTurn> = (0..users.len().max(models.len()))
            .filter_map(|i| {
                let user = users.get(i).map(|el| element_to_markdown(*el));
                let assistant = models.get(i).map(|el| element_to_markdown(*el));
                ConversationTurn::new(user, assistant)
            })
            .collect();

        tracing::info!(turns = turns.len(), "Extracted conversation turns");
        turns
    }
}

impl Default for TurnExtractor {
    fn default() -> Self {
        Self::new(USER_TURN_TAG, MODEL_TURN_TAG).expect("hardcoded turn tags")
    }
}

fn parse_selector(tag: &str) -> Result<Selector, ConvertError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(ConvertError::InvalidTag {
            tag: tag.to_string(),
            reason: "empty tag name".to_string(),
        });
    }
    Selector::parse(tag).map_err(|e| ConvertError::InvalidTag {
        tag: tag.to_string(),
        reason: e.to_string(),
    })
}

/// Extract turns using the default transcript tags.
pub fn extract_turns(html: &str) -> Vec<ConversationTurn> {
    TurnExtractor::default().extract(html)
}
