//! # transcript-md - Chat Transcripts to Markdown
//!
//! Converts saved conversational-assistant transcripts, stored as HTML with
//! paired user-turn and model-turn elements, into readable Markdown.
//!
//! ## Features
//!
//! - **Positional pairing**: the i-th user turn goes with the i-th model turn
//! - **Markdown rewriting**: bold, italic, code, headings, lists, line breaks
//! - **Whitespace normalization**: idempotent, blank runs collapsed
//! - **Batch mode**: glob patterns, parallel conversion, per-file failures
//!
//! ## Quick Start
//!
//! ```
//! use transcript_md::convert::{assemble, extract_turns};
//!
//! let html = "<user-query>Hello <b>world</b></user-query>\
//!             <model-response>Hi!</model-response>";
//! let turns = extract_turns(html);
//! assert_eq!(turns[0].user(), Some("Hello **world**"));
//!
//! let doc = assemble(&turns, "Demo");
//! assert!(doc.starts_with("# Demo\n\n## Turn 1\n"));
//! ```

pub mod config;
pub mod convert;

pub use config::Config;
pub use convert::{
    assemble, convert_file, extract_turns, ConversationTurn, ConvertError, ConvertOptions,
};
