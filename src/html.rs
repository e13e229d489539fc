//! Embedded HTML detection and conversion to plain text

use regex::Regex;
use scraper::{Html, Node};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

const DOCTYPE_MARKER: &str = "<!DOCTYPE html";
const HTML_OPEN_MARKER: &str = "<html";
const HTML_CLOSE_MARKER: &str = "</html>";

/// Elements dropped together with their descendants
const REMOVED_ELEMENTS: &[&str] = &["script", "style", "head", "nav", "footer", "aside"];

/// Elements whose boundaries become line breaks in the extracted text
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

static TRAILING_WS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\x{a0}]+\n").unwrap());

static LEADING_WS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r\x{a0}]+").unwrap());

static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static HORIZONTAL_WS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x{a0}]{2,}").unwrap());

/// Locate an embedded HTML document by its structural markers
///
/// Returns the byte range from `<!DOCTYPE html` through the end of the first
/// `</html>` that follows the first `<html` at or after the doctype. No
/// parsing happens here.
#[must_use]
pub fn locate_html(text: &str) -> Option<Range<usize>> {
    let start = text.find(DOCTYPE_MARKER)?;
    let open = start + text[start..].find(HTML_OPEN_MARKER)?;
    let close = open + text[open..].find(HTML_CLOSE_MARKER)?;

    Some(start..close + HTML_CLOSE_MARKER.len())
}

/// Convert an HTML fragment into normalized plain text
///
/// Script, style and page chrome are dropped, images with alt text become
/// their own paragraph and block elements break lines.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let document = Html::parse_document(html);
    normalize_whitespace(&extract_text(&document))
}

/// Replace an embedded HTML document with its plain text
///
/// Text without a complete HTML document is returned unchanged. Content
/// around the document is kept byte for byte.
#[must_use]
pub fn compose_body(text: &str) -> String {
    let Some(span) = locate_html(text) else {
        return text.to_string();
    };

    let clean = sanitize_html(&text[span.clone()]);
    debug!(
        html_len = span.len(),
        text_len = clean.len(),
        "Replaced embedded HTML document"
    );

    // The doctype marker is the first in the text, so no earlier copy of the
    // span can exist and replacing in place matches a first-occurrence replace.
    let mut composed = String::with_capacity(text.len() - span.len() + clean.len());
    composed.push_str(&text[..span.start]);
    composed.push_str(&clean);
    composed.push_str(&text[span.end..]);
    composed
}

/// Collapse whitespace the way the sanitizer does
///
/// Trailing whitespace and indentation are stripped from every line, runs of
/// blank lines shrink to one, runs of spaces shrink to one and the result is
/// trimmed. Applying it twice changes nothing.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let text = TRAILING_WS_REGEX.replace_all(text, "\n");
    let text = LEADING_WS_REGEX.replace_all(&text, "\n");
    let text = BLANK_LINES_REGEX.replace_all(&text, "\n\n");
    let text = HORIZONTAL_WS_REGEX.replace_all(&text, " ");

    text.trim().to_string()
}

enum Visit<N> {
    Enter(N),
    Leave,
}

fn extract_text(document: &Html) -> String {
    let mut out = String::new();
    let mut stack = vec![Visit::Enter(document.tree.root())];

    while let Some(visit) = stack.pop() {
        let node = match visit {
            Visit::Enter(node) => node,
            Visit::Leave => {
                out.push('\n');
                continue;
            }
        };

        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if REMOVED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" || name == "hr" {
                    out.push('\n');
                    continue;
                }
                if name == "img" {
                    if let Some(alt) = element.attr("alt").map(str::trim)
                        && !alt.is_empty()
                    {
                        out.push('\n');
                        out.push_str(alt);
                        out.push('\n');
                    }
                    continue;
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                    stack.push(Visit::Leave);
                }
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev().map(Visit::Enter));
            }
            Node::Document | Node::Fragment => {
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev().map(Visit::Enter));
            }
            _ => {}
        }
    }

    out
}
