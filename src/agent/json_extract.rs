//! Resilient JSON Extraction
//!
//! LLM output is supposed to be JSON but frequently arrives wrapped in prose or
//! markdown. Extraction tries three strategies in order, first success wins:
//! 1. Parse the whole response
//! 2. Parse the body of the first fenced code block
//! 3. Parse the first balanced `{...}` object found by brace matching

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("valid fence regex"));

/// Extraction failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Empty response")]
    Empty,
    #[error("Could not parse JSON from response")]
    NoJson,
}

/// Extract the first JSON value from free text.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(body) = FENCED_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) {
            return Ok(value);
        }
    }

    if let Some(object) = extract_json_object(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(object) {
            return Ok(value);
        }
    }

    Err(ExtractError::NoJson)
}

/// Find the first balanced `{...}` span, skipping braces inside string literals.
pub fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
