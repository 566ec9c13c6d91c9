//! Typed JSON extraction from free-form model output
//!
//! Models wrap JSON in prose or code fences. The outermost bracketed span is
//! taken (first opening bracket to last closing one) and parsed into the
//! requested type.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

use crate::error::ExtractError;

static ARRAY_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").ok());

static OBJECT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").ok());

/// Parse the outermost `[...]` span of `text` as a `Vec<T>`
pub fn extract_json_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ExtractError> {
    let span = find_span(&ARRAY_PATTERN, text).ok_or(ExtractError::NotFound { kind: "array" })?;
    Ok(serde_json::from_str(span)?)
}

/// Parse the outermost `{...}` span of `text` as a `T`
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span =
        find_span(&OBJECT_PATTERN, text).ok_or(ExtractError::NotFound { kind: "object" })?;
    Ok(serde_json::from_str(span)?)
}

fn find_span<'a>(pattern: &LazyLock<Option<Regex>>, text: &'a str) -> Option<&'a str> {
    pattern
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str())
}
