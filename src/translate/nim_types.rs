//! Types for the NVIDIA NIM chat completions endpoint.
//!
//! The request is fully typed. Responses are read leniently: only `choices`
//! is required, and fields forwarded verbatim stay untyped JSON.

use super::openai_types::{text_message, ChatMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Request types (what we send TO the upstream)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NimRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u64,
    pub stream: bool,
}

/// One-token request used to check whether the upstream serves a model.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u64,
}

impl ProbeRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![text_message("user", "test")],
            max_tokens: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Response types (what we receive FROM the upstream)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NimResponse {
    pub choices: Vec<NimChoice>,
    #[serde(default)]
    pub usage: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NimChoice {
    #[serde(default)]
    pub index: Value,
    #[serde(default)]
    pub message: NimMessage,
    #[serde(default)]
    pub finish_reason: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NimMessage {
    #[serde(default)]
    pub role: Value,
    #[serde(default)]
    pub content: Value,
    /// Chain-of-thought tokens; never forwarded.
    #[serde(default)]
    pub reasoning_content: Value,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Error body shape NIM uses for rejected requests.
#[derive(Debug, Clone, Deserialize)]
pub struct NimErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl NimErrorBody {
    /// The `detail` field when it is a plain string.
    pub fn detail_message(&self) -> Option<&str> {
        self.detail.as_ref().and_then(|d| d.as_str())
    }
}
