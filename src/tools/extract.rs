//! HTML to plain text extraction.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

/// Elements whose subtrees never contribute text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Appended to extracted text that was cut at the length limit.
pub const TRUNCATION_MARKER: &str = "...[content truncated due to length]";

/// Default length limit for extracted text, in characters.
pub const DEFAULT_MAX_CHARS: usize = 15_000;

static NEWLINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());

/// Extract readable text from an HTML document using the default length limit.
pub fn extract(html: &str) -> String {
    extract_with_limit(html, DEFAULT_MAX_CHARS)
}

/// Extract readable text from an HTML document.
///
/// Drops script, style, nav, footer and header subtrees, joins the remaining
/// text nodes with newlines, collapses newline and space runs, and truncates
/// to `max_chars` characters (appending [`TRUNCATION_MARKER`]). Malformed
/// markup is parsed leniently.
pub fn extract_with_limit(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let mut pieces = Vec::new();
    collect_text(document.root_element(), &mut pieces);

    let text = pieces.join("\n");
    let text = NEWLINE_RUNS.replace_all(&text, "\n");
    let text = SPACE_RUNS.replace_all(&text, " ");

    truncate(text.trim(), max_chars)
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(&**text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
