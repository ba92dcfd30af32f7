//! Key-term highlighting over text and HTML markup
//!
//! Wraps every whole-word, case-insensitive occurrence of each term in a
//! `<mark class="key-term">` element, with these rules:
//! - Terms are matched longest first, so `cell membrane` claims its text
//!   before `cell` gets a chance to split it.
//! - A match must sit on word boundaries on both sides (`cell` never
//!   matches inside `cellular`).
//! - Matches inside an open tag (`<span class="cell">`) or a character
//!   entity (`&amp;`) are left alone.
//! - Every term is matched against the original text and the wrapping is
//!   rendered in one pass, so a later term never sees markers inserted for
//!   an earlier one and overlapping terms cannot corrupt each other.
//!
//! [`remove_highlights`] is the inverse and restores the original text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::warn;

/// CSS class carried by every inserted marker
pub const MARK_CLASS: &str = "key-term";

const MARK_CLOSE: &str = "</mark>";

/// A marker inserted by [`highlight_terms`], with its inner text captured
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<mark class="key-term" data-term="[^"]*">(.*?)</mark>"#)
        .expect("Valid highlight marker regex")
});

/// One claimed occurrence of a term in the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSpan {
    /// Byte range in the original text
    pub range: Range<usize>,
    /// The term that claimed it, as supplied by the caller
    pub term: String,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `pos` falls between a `<` and its closing `>`
fn is_inside_tag(text: &str, pos: usize) -> bool {
    let before = &text[..pos];
    match before.rfind('<') {
        Some(lt) => !before[lt..].contains('>'),
        None => false,
    }
}

/// True when `range` lies inside a character entity such as `&amp;`
fn is_inside_entity(text: &str, range: &Range<usize>) -> bool {
    let before = &text[..range.start];
    let Some(amp) = before.rfind('&') else {
        return false;
    };
    let lead_ok = before[amp + 1..]
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '#');
    if !lead_ok {
        return false;
    }
    let after = &text[range.end..];
    let tail: String = after
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    after[tail.len()..].starts_with(';')
}

fn on_word_boundaries(text: &str, term: &str, range: &Range<usize>) -> bool {
    let starts_with_word = term.chars().next().is_some_and(is_word_char);
    let ends_with_word = term.chars().next_back().is_some_and(is_word_char);

    let left_ok = !starts_with_word
        || !text[..range.start]
            .chars()
            .next_back()
            .is_some_and(is_word_char);
    let right_ok = !ends_with_word || !text[range.end..].chars().next().is_some_and(is_word_char);

    left_ok && right_ok
}

/// Usable terms ordered by descending character length.
///
/// Blank terms are dropped, surrounding whitespace is trimmed, duplicates
/// keep their first position. Equal lengths keep input order.
pub fn order_terms<S: AsRef<str>>(terms: &[S]) -> Vec<&str> {
    let mut ordered: Vec<&str> = Vec::new();
    for term in terms.iter().map(|t| t.as_ref().trim()) {
        if !term.is_empty() && !ordered.contains(&term) {
            ordered.push(term);
        }
    }
    ordered.sort_by_key(|term| std::cmp::Reverse(term.chars().count()));
    ordered
}

/// Compute every span to wrap, without modifying `text`.
///
/// Returned spans are non-overlapping and sorted by start offset.
pub fn find_spans<S: AsRef<str>>(text: &str, terms: &[S]) -> Vec<TermSpan> {
    let mut spans: Vec<TermSpan> = Vec::new();

    for term in order_terms(terms) {
        let pattern = match Regex::new(&format!("(?i){}", regex::escape(term))) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("Skipping term '{}': {}", term, e);
                continue;
            }
        };

        let mut pos = 0;
        while pos <= text.len() {
            let Some(found) = pattern.find_at(text, pos) else {
                break;
            };
            let range = found.range();

            let accepted = on_word_boundaries(text, term, &range)
                && !is_inside_tag(text, range.start)
                && !is_inside_entity(text, &range)
                && !spans
                    .iter()
                    .any(|s| s.range.start < range.end && range.start < s.range.end);

            if accepted {
                pos = range.end;
                spans.push(TermSpan {
                    range,
                    term: term.to_string(),
                });
            } else {
                // retry one character later; a rejected match may hide a valid one
                pos = range.start
                    + text[range.start..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(1);
            }
        }
    }

    spans.sort_by_key(|s| s.range.start);
    spans
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap every occurrence of every term in a key-term marker
pub fn highlight_terms<S: AsRef<str>>(text: &str, terms: &[S]) -> String {
    let spans = find_spans(text, terms);
    if spans.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + spans.len() * 48);
    let mut cursor = 0;
    for span in &spans {
        out.push_str(&text[cursor..span.range.start]);
        out.push_str(&format!(
            r#"<mark class="{}" data-term="{}">"#,
            MARK_CLASS,
            escape_attribute(&span.term)
        ));
        out.push_str(&text[span.range.clone()]);
        out.push_str(MARK_CLOSE);
        cursor = span.range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Remove all key-term markers, keeping their inner text
pub fn remove_highlights(text: &str) -> String {
    MARKER.replace_all(text, "${1}").into_owned()
}
