//! Translate caller chat requests into NIM requests.

use super::nim_types::NimRequest;
use super::openai_types::ChatRequest;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Translate a caller request into the upstream shape.
/// Pure function: `nim_model` is the already-resolved upstream model id.
///
/// A zero `temperature` or `max_tokens` counts as unset and gets the default.
pub fn openai_to_nim(req: &ChatRequest, nim_model: &str) -> NimRequest {
    NimRequest {
        model: nim_model.to_string(),
        messages: req.messages.clone(),
        temperature: req
            .temperature
            .filter(|t| *t != 0.0)
            .unwrap_or(DEFAULT_TEMPERATURE),
        max_tokens: req
            .max_tokens
            .filter(|n| *n != 0)
            .unwrap_or(DEFAULT_MAX_TOKENS),
        stream: req.stream.unwrap_or(false),
    }
}
