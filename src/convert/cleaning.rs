//! Text cleaning rules applied to converted Markdown.
//!
//! Each rule is a self-contained function over the whole text, tagged with
//! the passes it belongs to. Two passes exist:
//!
//! - [`Pass::Normalize`]: runs on every converted element. Strips trailing
//!   whitespace, collapses runs of blank lines and trims blank lines at the
//!   edges. Running it twice is a no-op.
//! - [`Pass::Fences`]: runs on turn text during document assembly. Puts
//!   every code fence on its own line, then collapses blank lines again.
//!
//! ## Adding new rules
//!
//! 1. Write a function with signature `fn(&mut String) -> usize` returning
//!    the number of changes made
//! 2. Add a `CleaningRule` entry to `ALL_RULES` (order matters)
//! 3. Tag it with the passes that should run it

use std::sync::LazyLock;

use regex::Regex;

/// Matches three or more consecutive newlines.
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("hardcoded blank run regex"));

/// Markdown code fence delimiter.
pub const FENCE: &str = "```";

/// A group of rules run together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Normalize,
    Fences,
}

/// A cleaning rule that rewrites text in place.
pub struct CleaningRule {
    pub name: &'static str,
    pub description: &'static str,
    pub passes: &'static [Pass],
    pub apply: fn(&mut String) -> usize,
}

/// All registered cleaning rules, applied in order.
static ALL_RULES: &[CleaningRule] = &[
    CleaningRule {
        name: "code_fences",
        description: "Put every ``` fence on its own line",
        passes: &[Pass::Fences],
        apply: rule_code_fences,
    },
    CleaningRule {
        name: "trailing_whitespace",
        description: "Strip trailing whitespace from each line",
        passes: &[Pass::Normalize],
        apply: rule_trailing_whitespace,
    },
    CleaningRule {
        name: "blank_lines",
        description: "Collapse 3+ consecutive newlines to 2",
        passes: &[Pass::Normalize, Pass::Fences],
        apply: rule_blank_lines,
    },
    CleaningRule {
        name: "edge_blank_lines",
        description: "Remove blank lines at the start and end",
        passes: &[Pass::Normalize],
        apply: rule_edge_blank_lines,
    },
];

/// Run every rule tagged with `pass`, in table order.
pub fn clean_text(input: &str, pass: Pass) -> String {
    let _span = tracing::debug_span!("clean_text", ?pass).entered();

    let mut text = input.to_string();
    for rule in ALL_RULES.iter().filter(|r| r.passes.contains(&pass)) {
        let count = (rule.apply)(&mut text);
        if count > 0 {
            tracing::debug!(rule = rule.name, changes = count, "Cleaning rule applied");
        }
    }
    text
}

/// Whitespace normalization for converted element text.
pub fn normalize_whitespace(input: &str) -> String {
    clean_text(input, Pass::Normalize)
}

/// Code-fence spacing for assembled turn text.
pub fn space_code_fences(input: &str) -> String {
    clean_text(input, Pass::Fences)
}

// ============ Rule Implementations ============

/// Ensure every fence is preceded and followed by a newline.
///
/// Text glued to either side of a fence, an info string included, is moved
/// onto its own line.
fn rule_code_fences(text: &mut String) -> usize {
    if !text.contains(FENCE) {
        return 0;
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut inserted = 0;
    let mut rest = text.as_str();

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
            inserted += 1;
        }
        out.push_str(FENCE);
        rest = &rest[pos + FENCE.len()..];
        if !rest.is_empty() && !rest.starts_with('\n') {
            out.push('\n');
            inserted += 1;
        }
    }
    out.push_str(rest);

    if inserted > 0 {
        *text = out;
    }
    inserted
}

fn rule_trailing_whitespace(text: &mut String) -> usize {
    let mut changed = 0;
    let stripped: Vec<&str> = text
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_end();
            if trimmed.len() != line.len() {
                changed += 1;
            }
            trimmed
        })
        .collect();
    if changed > 0 {
        *text = stripped.join("\n");
    }
    changed
}

fn rule_blank_lines(text: &mut String) -> usize {
    let runs = BLANK_RUN_RE.find_iter(text).count();
    if runs > 0 {
        *text = BLANK_RUN_RE.replace_all(text, "\n\n").into_owned();
    }
    runs
}

fn rule_edge_blank_lines(text: &mut String) -> usize {
    let trimmed = text.trim_matches('\n');
    let removed = text.len() - trimmed.len();
    if removed > 0 {
        *text = trimmed.to_string();
    }
    removed
}
