//! Markdown document assembly from extracted turns.

use serde::Deserialize;

use super::cleaning::space_code_fences;
use super::extract::ConversationTurn;

/// Notice emitted when a transcript holds no turns.
pub const NO_CONVERSATION_NOTICE: &str = "No conversation found.";

/// Horizontal rule closing each turn.
const TURN_SEPARATOR: &str = "---";

/// Overall layout of the generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStyle {
    /// Title, numbered turn headings and per-speaker subheadings
    #[default]
    Full,
    /// Bold speaker labels only, no title or turn headings
    Simple,
}

/// Rendering options for [`render_document`].
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub style: DocumentStyle,
    pub user_label: String,
    pub assistant_label: String,
}

impl DocumentOptions {
    pub const DEFAULT_USER_LABEL: &'static str = "User";
    pub const DEFAULT_ASSISTANT_LABEL: &'static str = "Assistant";
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            style: DocumentStyle::Full,
            user_label: Self::DEFAULT_USER_LABEL.to_string(),
            assistant_label: Self::DEFAULT_ASSISTANT_LABEL.to_string(),
        }
    }
}

/// Assemble a titled Markdown document with default options.
pub fn assemble(turns: &[ConversationTurn], title: &str) -> String {
    render_document(turns, title, &DocumentOptions::default())
}

/// Assemble turns into a Markdown document in the requested style.
pub fn render_document(turns: &[ConversationTurn], title: &str, opts: &DocumentOptions) -> String {
    let _span = tracing::debug_span!("render_document", turns = turns.len(), style = ?opts.style)
        .entered();
    match opts.style {
        DocumentStyle::Full => render_full(turns, title, opts),
        DocumentStyle::Simple => render_simple(turns, opts),
    }
}

fn render_full(turns: &[ConversationTurn], title: &str, opts: &DocumentOptions) -> String {
    if turns.is_empty() {
        return format!("# {title}\n\n{NO_CONVERSATION_NOTICE}\n");
    }

    let mut lines: Vec<String> = vec![format!("# {title}\n")];
    for (i, turn) in turns.iter().enumerate() {
        lines.push(format!("## Turn {}\n", i + 1));
        push_section(&mut lines, format!("### {}", opts.user_label), turn.user());
        push_section(&mut lines, format!("### {}", opts.assistant_label), turn.assistant());
        lines.push(format!("{TURN_SEPARATOR}\n"));
    }
    lines.join("\n")
}

fn render_simple(turns: &[ConversationTurn], opts: &DocumentOptions) -> String {
    if turns.is_empty() {
        return format!("{NO_CONVERSATION_NOTICE}\n");
    }

    let mut lines: Vec<String> = Vec::new();
    for turn in turns {
        push_section(&mut lines, format!("**{}:**", opts.user_label), turn.user());
        push_section(&mut lines, format!("**{}:**", opts.assistant_label), turn.assistant());
        lines.push(format!("{TURN_SEPARATOR}\n"));
    }
    lines.join("\n")
}

/// Heading, fence-spaced body and a blank line. Absent or empty text adds
/// nothing.
fn push_section(lines: &mut Vec<String>, heading: String, text: Option<&str>) {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return;
    };
    lines.push(heading);
    lines.push(space_code_fences(text));
    lines.push(String::new());
}
