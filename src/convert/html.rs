//! HTML element to Markdown conversion.
//!
//! Walks one element's subtree and emits Markdown for the small tag
//! vocabulary found in exported chat transcripts: paragraphs, divisions,
//! line breaks, bold/italic, inline code, preformatted blocks, headings
//! h1-h6 and ordered/unordered lists. Decorative elements (scripts, styles,
//! SVG) are dropped. Anything else is transparent: its children are
//! rendered in place.
//!
//! Block elements (paragraphs, divisions, list items, headings) start on
//! a fresh line and are followed by a blank line, as are lists. Blank-line
//! runs are collapsed afterwards, so nesting never stacks them.
//!
//! The parsed tree is never mutated. Each node kind maps to one render
//! function, so rules cannot interfere with each other.

use scraper::{ElementRef, Html, Node};

use super::cleaning::normalize_whitespace;

/// Elements whose content is discarded entirely.
const DISCARD_TAGS: &[&str] = &["script", "style", "svg", "path"];

/// Embedded headings are demoted this many levels, because the document
/// itself owns `#` (title) and `##` (turn) headings.
const HEADING_DEMOTION: usize = 2;

/// Deepest heading Markdown supports.
const MAX_HEADING_LEVEL: usize = 6;

/// How a single element is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Discard,
    LineBreak,
    Bold,
    Italic,
    Code,
    Preformatted,
    Heading(usize),
    OrderedList,
    UnorderedList,
    Paragraph,
    Block,
    /// Unknown or structural element: render children in place.
    Transparent,
}

impl TagKind {
    fn of(name: &str) -> Self {
        match name {
            n if DISCARD_TAGS.contains(&n) => TagKind::Discard,
            "br" => TagKind::LineBreak,
            "b" | "strong" => TagKind::Bold,
            "i" | "em" => TagKind::Italic,
            "code" => TagKind::Code,
            "pre" => TagKind::Preformatted,
            "h1" => TagKind::Heading(1),
            "h2" => TagKind::Heading(2),
            "h3" => TagKind::Heading(3),
            "h4" => TagKind::Heading(4),
            "h5" => TagKind::Heading(5),
            "h6" => TagKind::Heading(6),
            "ol" => TagKind::OrderedList,
            "ul" => TagKind::UnorderedList,
            "p" => TagKind::Paragraph,
            "div" | "li" => TagKind::Block,
            _ => TagKind::Transparent,
        }
    }
}

/// Convert one element's content to normalized Markdown.
///
/// The element itself is treated as a container: only its children are
/// rendered, so a `<user-query>` or `<model-response>` root contributes no
/// markup of its own. Never fails; unexpected tags are passed through.
pub fn element_to_markdown(element: ElementRef<'_>) -> String {
    let mut writer = MarkdownWriter::default();
    writer.render_children(element);
    normalize_whitespace(&writer.finish())
}

/// Parse an HTML fragment and convert it to normalized Markdown.
///
/// Convenience wrapper over [`element_to_markdown`] for callers holding a
/// string rather than a parsed tree.
pub fn html_to_markdown(fragment: &str) -> String {
    let _span = tracing::debug_span!("html_to_markdown", bytes = fragment.len()).entered();
    let html = Html::parse_fragment(fragment);
    element_to_markdown(html.root_element())
}

/// Accumulates Markdown output while walking the tree.
#[derive(Default)]
struct MarkdownWriter {
    out: String,
}

impl MarkdownWriter {
    fn finish(self) -> String {
        self.out
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Start a new line unless already at one.
    fn ensure_line_start(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    /// Push source text with HTML whitespace collapsing applied.
    ///
    /// Leading whitespace is dropped at the start of a line so indentation
    /// from the HTML source does not leak into the output.
    fn push_text(&mut self, text: &str) {
        let collapsed = collapse_whitespace(text);
        let collapsed = if self.at_line_start() {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        self.out.push_str(collapsed);
    }

    fn push_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn render_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        self.render_element(el);
                    }
                }
                _ => {}
            }
        }
    }

    fn render_element(&mut self, element: ElementRef<'_>) {
        match TagKind::of(element.value().name()) {
            TagKind::Discard => {}
            TagKind::LineBreak => self.push_raw("\n"),
            TagKind::Bold => self.push_raw(&render_bold(element)),
            TagKind::Italic => {
                self.push_raw(&wrap_inline(&inline_text(element, KeepBold::Yes), "*"))
            }
            TagKind::Code => self.push_raw(&render_inline_code(&flatten_text(element))),
            TagKind::Preformatted => {
                self.ensure_line_start();
                self.push_raw(&render_preformatted(element));
            }
            TagKind::Heading(level) => self.push_raw(&render_heading(element, level)),
            TagKind::OrderedList => {
                self.push_raw(&render_list(element, ListMarker::Ordered));
                self.push_raw("\n");
            }
            TagKind::UnorderedList => {
                self.push_raw(&render_list(element, ListMarker::Bullet));
                self.push_raw("\n");
            }
            TagKind::Paragraph | TagKind::Block => {
                self.ensure_line_start();
                self.render_children(element);
                self.ensure_line_start();
                self.push_raw("\n");
            }
            TagKind::Transparent => self.render_children(element),
        }
    }
}

/// Collapse every run of HTML whitespace to a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Whether nested bold elements keep their `**` markers when flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeepBold {
    Yes,
    No,
}

/// All text below `element`, with line breaks kept and discarded
/// subtrees skipped. No whitespace collapsing.
fn flatten_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    flatten_into(element, KeepBold::No, &mut out);
    out
}

fn flatten_into(element: ElementRef<'_>, keep_bold: KeepBold, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match TagKind::of(el.name()) {
                    TagKind::Discard => {}
                    TagKind::LineBreak => out.push('\n'),
                    TagKind::Bold if keep_bold == KeepBold::Yes => {
                        out.push_str(&render_bold(child_el))
                    }
                    _ => flatten_into(child_el, keep_bold, out),
                }
            }
            _ => {}
        }
    }
}

/// Flattened text for inline formatting: whitespace collapsed per line.
fn inline_text(element: ElementRef<'_>, keep_bold: KeepBold) -> String {
    let mut flat = String::new();
    flatten_into(element, keep_bold, &mut flat);
    flat.split('\n')
        .map(collapse_whitespace)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bold wraps its fully flattened text; nothing nested survives.
fn render_bold(element: ElementRef<'_>) -> String {
    wrap_inline(&inline_text(element, KeepBold::No), "**")
}

/// Wrap `text` in `marker`, keeping surrounding whitespace outside the
/// markers so `**x**` never turns into `** x**`.
fn wrap_inline(text: &str, marker: &str) -> String {
    let inner = text.trim();
    if inner.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];
    format!("{lead}{marker}{inner}{marker}{trail}")
}

/// Inline code span. Uses a double-backtick delimiter when the content
/// itself contains a backtick.
fn render_inline_code(text: &str) -> String {
    let text = collapse_whitespace(text);
    if text.trim().is_empty() {
        return text;
    }
    if text.contains('`') {
        format!("`` {} ``", text.trim())
    } else {
        format!("`{}`", text.trim())
    }
}

/// Fenced code block from a `<pre>` element, raw text kept verbatim.
///
/// Fences carry no info string: fence spacing during assembly moves any
/// text after a fence onto its own line.
fn render_preformatted(element: ElementRef<'_>) -> String {
    let body = flatten_text(element);
    let body = body.trim_matches('\n');
    format!("```\n{body}\n```\n")
}

/// `\n### text\n\n` for an `<h1>`, two levels deeper for every heading.
///
/// Inline Markdown inside the heading (bold, italic, code) is kept; any
/// line structure is folded onto the one heading line.
fn render_heading(element: ElementRef<'_>, level: usize) -> String {
    let depth = (level + HEADING_DEMOTION).min(MAX_HEADING_LEVEL);
    let mut writer = MarkdownWriter::default();
    writer.render_children(element);
    let text = writer
        .finish()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("\n{} {}\n\n", "#".repeat(depth), text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMarker {
    Ordered,
    Bullet,
}

/// Render a list from its direct `<li>` children only.
///
/// Nested lists inside an item are rendered beneath that item, indented to
/// the item's content column so Markdown keeps them nested. Items with no
/// text and no nested list are skipped and do not consume a number.
fn render_list(list: ElementRef<'_>, marker: ListMarker) -> String {
    let lines = list_lines(list, marker);
    if lines.is_empty() {
        return String::new();
    }
    format!("\n{}\n", lines.join("\n"))
}

fn list_lines(list: ElementRef<'_>, marker: ListMarker) -> Vec<String> {
    let mut number = list
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let mut lines = Vec::new();
    // Content column of the last rendered item
    let mut last_indent = String::new();

    for child in list.children().filter_map(ElementRef::wrap) {
        // A list directly inside a list belongs to the item before it
        let stray = match TagKind::of(child.value().name()) {
            TagKind::OrderedList => Some(ListMarker::Ordered),
            TagKind::UnorderedList => Some(ListMarker::Bullet),
            _ => None,
        };
        if let Some(stray_marker) = stray {
            for line in list_lines(child, stray_marker) {
                lines.push(format!("{last_indent}{line}"));
            }
            continue;
        }
        if child.value().name() != "li" {
            continue;
        }

        let (text, nested) = split_list_item(child);
        let text = normalize_whitespace(&text);
        if text.is_empty() && nested.is_empty() {
            continue;
        }

        let prefix = match marker {
            ListMarker::Ordered => format!("{number}. "),
            ListMarker::Bullet => "- ".to_string(),
        };
        let indent = " ".repeat(prefix.len());

        if !text.is_empty() {
            let mut item_lines = text.lines();
            if let Some(first) = item_lines.next() {
                lines.push(format!("{prefix}{first}"));
            }
            for continuation in item_lines {
                if continuation.is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{indent}{continuation}"));
                }
            }
        } else {
            lines.push(prefix.trim_end().to_string());
        }

        for line in nested {
            lines.push(format!("{indent}{line}"));
        }
        last_indent = indent;
        number += 1;
    }

    lines
}

/// Split a list item into its own rendered text and the lines of any
/// lists nested directly inside it.
fn split_list_item(item: ElementRef<'_>) -> (String, Vec<String>) {
    let mut writer = MarkdownWriter::default();
    let mut nested = Vec::new();

    for child in item.children() {
        match child.value() {
            Node::Text(text) => writer.push_text(text),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match TagKind::of(el.name()) {
                    TagKind::OrderedList => nested.extend(list_lines(child_el, ListMarker::Ordered)),
                    TagKind::UnorderedList => nested.extend(list_lines(child_el, ListMarker::Bullet)),
                    _ => writer.render_element(child_el),
                }
            }
            _ => {}
        }
    }

    (writer.finish(), nested)
}
