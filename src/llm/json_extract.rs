// ABOUTME: Recovers a JSON object from model output that may be wrapped in prose or code fences
// ABOUTME: Tries a direct parse, then a fenced block, then balanced brace spans with trailing commas removed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Robust JSON Extraction
//!
//! Models asked for "pure JSON" still occasionally answer with a sentence of
//! preamble or a fenced code block. The primary path is a strict parse; the
//! fallbacks below only run when that fails.
//!
//! 1. Parse the whole text.
//! 2. Parse the contents of the first fenced block (```` ``` ```` or ```` ```json ````).
//! 3. Parse each balanced `{ ... }` span, in order of appearance.
//!
//! Trailing commas directly before `}` or `]` are removed before every
//! fallback parse attempt.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::{AppError, AppResult};

static FENCED_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").ok());

static TRAILING_COMMA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").ok());

/// Extract the first JSON object recoverable from `text`
///
/// # Errors
///
/// Returns `NoStructuredDataFound` when no strategy yields valid JSON.
pub fn extract_json(text: &str) -> AppResult<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(value);
    }

    if let Some(block) = fenced_block(text) {
        if let Some(value) = parse_lenient(block) {
            debug!("Recovered JSON from fenced block");
            return Ok(value);
        }
    }

    if let Some(value) = balanced_spans(text).into_iter().find_map(parse_lenient) {
        debug!("Recovered JSON from embedded object");
        return Ok(value);
    }

    Err(AppError::no_structured_data(
        "No JSON object found in model output",
    ))
}

fn fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .as_ref()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn strip_trailing_commas(raw: &str) -> String {
    TRAILING_COMMA.as_ref().map_or_else(
        || raw.to_owned(),
        |re| re.replace_all(raw, "$1").into_owned(),
    )
}

fn parse_lenient(raw: &str) -> Option<Value> {
    serde_json::from_str(strip_trailing_commas(raw).trim()).ok()
}

/// Every balanced `{ ... }` span, skipping braces inside string literals
fn balanced_spans(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        match matching_close(bytes, open) {
            Some(close) => {
                spans.push(&text[open..=close]);
                start = open + 1;
            }
            None => break,
        }
    }
    spans
}

fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, &byte) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use pharmora_core::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_direct_parse() {
        assert_eq!(extract_json(r#" {"a": 1} "#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_block_with_language_tag() {
        let text = "Here you go:\n```json\n{\"a\": [1, 2,],}\n```\nThanks";
        assert_eq!(extract_json(text).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_fenced_block_without_language_tag() {
        let text = "```\n{\"dose_units\": 3.5}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"dose_units": 3.5}));
    }

    #[test]
    fn test_embedded_object_in_prose() {
        let text = "Sure! The result is {\"x\": {\"y\": \"}\"}} and that's it.";
        assert_eq!(extract_json(text).unwrap(), json!({"x": {"y": "}"}}));
    }

    #[test]
    fn test_later_span_used_when_first_is_invalid() {
        let text = "{not json} then {\"ok\": true}";
        assert_eq!(extract_json(text).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_no_json_is_no_structured_data() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoStructuredDataFound);
        let err = extract_json("{ unclosed").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoStructuredDataFound);
    }
}
