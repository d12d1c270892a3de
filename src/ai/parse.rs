//! Parsing of model reply text into a JSON report.
//!
//! Models frequently wrap JSON in a fenced code block even when asked
//! not to, so the parser looks for a ```json fence first and falls back
//! to treating the whole reply as JSON.

use serde_json::Value;
use tracing::debug;

/// Slice out the contents of the first ```json fenced block, if any.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Parse a model reply into a JSON object. Replies that parse to
/// something other than an object (arrays, bare numbers) are rejected
/// so downstream consumers can rely on named fields.
pub fn parse_analysis_text(text: &str) -> Option<Value> {
    let candidate = extract_json_block(text).unwrap_or_else(|| text.trim());
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            debug!("model reply parsed as JSON but was not an object");
            None
        }
        Err(err) => {
            debug!("model reply was not valid JSON: {}", err);
            None
        }
    }
}
