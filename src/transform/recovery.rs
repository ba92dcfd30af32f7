//! Recovery of structured transform results from model replies
//!
//! Models asked for bare JSON still wrap it in code fences or surround it
//! with prose. Recovery tolerates, in order:
//! 1. A code fence wrapping the whole reply (with or without a language tag)
//! 2. Prose before/after the object: first `{` to last `}`
//! 3. Loose field types: missing or mistyped fields fall back to empty
//!
//! Before any of that, the reply is scanned for in-band error phrases. Some
//! services answer 200 with an error message as the content; such replies
//! fail as `Upstream` without a parse attempt. The scan is a substring
//! heuristic, so a note that legitimately talks about errors can trip it;
//! [`InBandScan::OutsideObject`] narrows it to the text around the object.

use crate::error::{NotewiseError, Result, DIAGNOSTIC_EXCERPT_CHARS};
use crate::types::TransformResult;
use crate::utils::string::excerpt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Phrases that mark a reply as a self-reported service failure
pub const IN_BAND_ERROR_MARKERS: [&str; 3] = ["error", "internal", "overloaded"];

/// Fence around the whole reply: ```lang ... ```, up to the last closing fence
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A```[A-Za-z0-9_+.-]*[ \t]*\r?\n?(.*)```\z").expect("Valid code fence regex")
});

/// Which part of a reply the in-band error scan looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InBandScan {
    /// The entire raw reply
    #[default]
    WholeReply,
    /// Only the text outside the outermost `{ ... }` span
    OutsideObject,
    /// No scan
    Disabled,
}

/// Find the first in-band error marker in `text`, case-insensitively
pub fn find_in_band_error(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    IN_BAND_ERROR_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}

/// Strip a code fence that wraps the entire reply, keeping its interior.
///
/// Fences elsewhere (inside a JSON string, after leading prose) are left
/// alone; the object slice handles those replies.
pub fn strip_code_fence(raw: &str) -> &str {
    match FENCED_BLOCK.captures(raw.trim()).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw,
    }
}

/// Byte range from the first `{` through the last `}`, if any
fn outer_object_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some((start, end + 1))
    } else {
        None
    }
}

/// Text outside the outer object span, used by [`InBandScan::OutsideObject`]
fn text_outside_object(text: &str) -> String {
    match outer_object_span(text) {
        Some((start, end)) => format!("{} {}", &text[..start], &text[end..]),
        None => text.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn coerce(object: &Map<String, Value>) -> TransformResult {
    TransformResult {
        formatted_text: object
            .get("formattedText")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        highlights: string_list(object.get("highlights")),
        comments: string_list(object.get("comments")),
    }
}

fn malformed(raw: &str) -> NotewiseError {
    NotewiseError::MalformedResponse {
        excerpt: excerpt(raw, DIAGNOSTIC_EXCERPT_CHARS),
    }
}

/// Recover a [`TransformResult`] from a raw model reply
pub fn recover_transform_result(raw: &str, scan: InBandScan) -> Result<TransformResult> {
    let scanned = match scan {
        InBandScan::WholeReply => Some(raw.to_string()),
        InBandScan::OutsideObject => Some(text_outside_object(strip_code_fence(raw))),
        InBandScan::Disabled => None,
    };
    if let Some(marker) = scanned.as_deref().and_then(find_in_band_error) {
        warn!("Model reply contains in-band error marker '{}'", marker);
        return Err(NotewiseError::Upstream(excerpt(
            raw.trim(),
            DIAGNOSTIC_EXCERPT_CHARS,
        )));
    }

    let unfenced = strip_code_fence(raw);
    let candidate = match outer_object_span(unfenced) {
        Some((start, end)) => &unfenced[start..end],
        None => unfenced.trim(),
    };

    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        debug!("Failed to parse model reply as JSON: {}", e);
        malformed(raw)
    })?;

    match value {
        Value::Object(object) => Ok(coerce(&object)),
        other => {
            debug!("Model reply parsed to a non-object JSON value: {}", other);
            Err(malformed(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str =
        r#"{"formattedText":"<p>Cells</p>","highlights":["cell"],"comments":["Check this"]}"#;

    fn expected() -> TransformResult {
        TransformResult {
            formatted_text: "<p>Cells</p>".to_string(),
            highlights: vec!["cell".to_string()],
            comments: vec!["Check this".to_string()],
        }
    }

    #[test]
    fn test_clean_reply_is_unchanged() {
        assert_eq!(strip_code_fence(CLEAN), CLEAN);
        let result = recover_transform_result(CLEAN, InBandScan::WholeReply).unwrap();
        assert_eq!(result, expected());
        assert_eq!(result, serde_json::from_str::<TransformResult>(CLEAN).unwrap());
    }

    #[test]
    fn test_fenced_reply_with_language_tag() {
        let raw = format!("```json\n{}\n```", CLEAN);
        assert_eq!(
            recover_transform_result(&raw, InBandScan::WholeReply).unwrap(),
            expected()
        );
    }

    #[test]
    fn test_fenced_reply_without_language_tag() {
        let raw = format!("```\n{}\n```", CLEAN);
        assert_eq!(
            recover_transform_result(&raw, InBandScan::WholeReply).unwrap(),
            expected()
        );
    }

    #[test]
    fn test_prose_wrapped_reply() {
        let raw = format!("Sure! Here is the JSON you asked for:\n{}\nHope that helps.", CLEAN);
        assert_eq!(
            recover_transform_result(&raw, InBandScan::WholeReply).unwrap(),
            expected()
        );
    }

    #[test]
    fn test_nested_braces_use_outer_span() {
        let raw = r#"Result: {"formattedText":"a {b} c","highlights":[],"comments":[]} done"#;
        let result = recover_transform_result(raw, InBandScan::WholeReply).unwrap();
        assert_eq!(result.formatted_text, "a {b} c");
    }

    #[test]
    fn test_parse_failure_is_malformed_with_excerpt() {
        let raw = format!("{{ not json at all {}", "x".repeat(400));
        match recover_transform_result(&raw, InBandScan::WholeReply) {
            Err(NotewiseError::MalformedResponse { excerpt }) => {
                assert_eq!(excerpt.chars().count(), 200);
                assert!(raw.starts_with(&excerpt));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_no_object_is_malformed() {
        assert!(matches!(
            recover_transform_result("just some words", InBandScan::WholeReply),
            Err(NotewiseError::MalformedResponse { .. })
        ));
        assert!(matches!(
            recover_transform_result("[1, 2, 3]", InBandScan::WholeReply),
            Err(NotewiseError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_in_band_error_skips_parse() {
        for raw in [
            "Internal server ERROR, please retry",
            "The service is Overloaded.",
            // would parse fine, but the scan runs first
            r#"{"formattedText":"error","highlights":[],"comments":[]}"#,
        ] {
            assert!(
                matches!(
                    recover_transform_result(raw, InBandScan::WholeReply),
                    Err(NotewiseError::Upstream(_))
                ),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_outside_object_scan_ignores_object_content() {
        let raw = r#"{"formattedText":"Standard error of the mean","highlights":[],"comments":[]}"#;
        let result = recover_transform_result(raw, InBandScan::OutsideObject).unwrap();
        assert_eq!(result.formatted_text, "Standard error of the mean");

        let raw = r#"Error: {"message":"overloaded"}"#;
        assert!(matches!(
            recover_transform_result(raw, InBandScan::OutsideObject),
            Err(NotewiseError::Upstream(_))
        ));
    }

    #[test]
    fn test_coercion_of_loose_fields() {
        let raw = r#"{"formattedText": 42, "highlights": "cell", "comments": ["ok", 7, null]}"#;
        let result = recover_transform_result(raw, InBandScan::WholeReply).unwrap();
        assert_eq!(result.formatted_text, "");
        assert!(result.highlights.is_empty());
        assert_eq!(result.comments, vec!["ok"]);
    }

    #[test]
    fn test_fence_inside_formatted_text_is_kept() {
        let raw = serde_json::json!({
            "formattedText": "Use ```js\nlet x = 1;\n``` to declare",
            "highlights": ["let"],
            "comments": []
        })
        .to_string();

        assert_eq!(strip_code_fence(&raw), raw);
        let result = recover_transform_result(&raw, InBandScan::WholeReply).unwrap();
        assert_eq!(result.formatted_text, "Use ```js\nlet x = 1;\n``` to declare");
        assert_eq!(result.highlights, vec!["let"]);
    }

    #[test]
    fn test_outer_fence_with_inner_fence() {
        let inner = serde_json::json!({
            "formattedText": "<pre>```sh\nls -la\n```</pre>",
            "highlights": [],
            "comments": []
        })
        .to_string();
        let raw = format!("```json\n{}\n```\n", inner);

        let result = recover_transform_result(&raw, InBandScan::WholeReply).unwrap();
        assert_eq!(result.formatted_text, "<pre>```sh\nls -la\n```</pre>");
    }

    #[test]
    fn test_prose_then_fence_uses_object_slice() {
        let raw = format!("Here you go:\n```json\n{}\n```", CLEAN);
        assert_eq!(
            recover_transform_result(&raw, InBandScan::WholeReply).unwrap(),
            expected()
        );
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let result = recover_transform_result("{}", InBandScan::WholeReply).unwrap();
        assert_eq!(result, TransformResult::default());
    }
}
