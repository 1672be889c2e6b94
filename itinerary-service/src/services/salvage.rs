//! Recovering a JSON object from free-form model output.
//!
//! The reply is cut from the first `{` to the last `}` and parsed. This is a
//! heuristic: it assumes a single object in the reply and no braces in the
//! prose around it.

use serde_json::Value;

/// Slice of `text` between the first `{` and the last `}` (inclusive).
///
/// Without a `{` the whole text is kept; without a `}` after it the result
/// is empty.
pub fn salvage_json(text: &str) -> &str {
    let from_first_brace = match text.find('{') {
        Some(start) => &text[start..],
        None => text,
    };

    match from_first_brace.rfind('}') {
        Some(end) => &from_first_brace[..=end],
        None => "",
    }
}

/// Trim `text` with [`salvage_json`] and parse the result.
pub fn parse_salvaged(text: &str) -> Result<Value, serde_json::Error> {
    let candidate = salvage_json(text);
    tracing::debug!(salvaged = %candidate, "Salvaged model reply");
    serde_json::from_str(candidate)
}
