//! Decoding of the recommendation endpoint's reply
//!
//! The endpoint wraps the model output as a JSON *string* inside a JSON
//! object (`{"response": "<json>"}`) or reports `{"error": "..."}`. This is the
//! only place that knows about that double encoding; everything downstream
//! works with a typed [`RecommendationResult`].

use serde::Deserialize;
use tracing::debug;

use crate::models::RecommendationResult;
use crate::{Result, WanderplanError};

/// Outer transport object returned by the endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ServiceEnvelope {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Turn an HTTP status and body into a recommendation result.
///
/// A non-success status fails regardless of the body. An `error` field fails
/// with its message. Otherwise the `response` string is parsed a second time.
pub fn decode_envelope(status: u16, body: &str) -> Result<RecommendationResult> {
    if !(200..300).contains(&status) {
        return Err(WanderplanError::transport(status));
    }

    let envelope: ServiceEnvelope = serde_json::from_str(body)?;

    if let Some(message) = envelope.error.filter(|message| !message.is_empty()) {
        return Err(WanderplanError::service(message));
    }

    let inner = envelope
        .response
        .ok_or_else(|| WanderplanError::parse("Response body has no 'response' field"))?;

    decode_recommendations(&inner)
}

/// Parse the inner model output into a recommendation result.
pub fn decode_recommendations(text: &str) -> Result<RecommendationResult> {
    let json = extract_json(text);
    let result: RecommendationResult = serde_json::from_str(json)?;
    debug!(
        "Decoded {} cities and {} travel-time origins",
        result.cities.len(),
        result.travel_times.len()
    );
    Ok(result)
}

/// JSON text inside a model reply: the content of the first Markdown code
/// fence when there is one (prose around it is ignored), otherwise the
/// trimmed reply.
pub(crate) fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let Some(end) = after.find("```") else {
        return trimmed;
    };
    let block = &after[..end];
    // drop the info string ("json") on the opening line
    let block = match block.split_once('\n') {
        Some((info, content)) if !info.trim_start().starts_with(['{', '[']) => content,
        _ => block,
    };
    block.trim()
}
