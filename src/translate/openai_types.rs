//! Caller-facing types for the
//! [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat).
//!
//! Only the top-level request fields the proxy acts on are typed. Messages
//! are opaque: every role and content shape the caller sends is forwarded
//! unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Request types (what callers send TO us)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatRequest {
    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

/// A conversation turn exactly as the caller sent it (`developer`, `tool`,
/// `content: null` with `tool_calls`, ...).
pub type ChatMessage = Value;

/// Plain-text message, used for requests the proxy originates itself.
pub fn text_message(role: &str, content: &str) -> ChatMessage {
    json!({"role": role, "content": content})
}

// ---------------------------------------------------------------------------
// Response types (what we send BACK to callers)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    /// Upstream usage, verbatim.
    pub usage: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: Value,
    pub message: ResponseMessage,
    pub finish_reason: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: Value,
    pub content: Value,
}

/// Usage reported when the upstream sends none.
pub fn zero_usage() -> Value {
    json!({"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_are_absent() {
        let req: ChatRequest = serde_json::from_value(json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();

        assert_eq!(req.temperature, None);
        assert_eq!(req.max_tokens, None);
        assert!(!req.is_streaming());
        assert_eq!(req.messages[0], text_message("user", "hi"));
    }

    #[test]
    fn test_any_message_shape_is_accepted() {
        let messages = json!([
            {"role": "developer", "content": "Stay in character."},
            {"role": "user", "content": [{"type": "text", "text": "hi"}], "name": "narrator"},
            {"role": "assistant", "content": null, "tool_calls": [
                {"id": "call_1", "type": "function", "function": {"name": "roll", "arguments": "{}"}}
            ]},
            {"role": "tool", "tool_call_id": "call_1", "content": "6"},
            {"role": "wizard"}
        ]);

        let req: ChatRequest = serde_json::from_value(json!({
            "model": "gpt-4",
            "messages": messages.clone()
        }))
        .unwrap();

        assert_eq!(serde_json::to_value(&req.messages).unwrap(), messages);
    }

    #[test]
    fn test_message_key_order_is_kept() {
        let raw = r#"{"model":"m","messages":[{"content":"hi","role":"user","name":"n"}]}"#;
        let req: ChatRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(
            serde_json::to_string(&req.messages[0]).unwrap(),
            r#"{"content":"hi","role":"user","name":"n"}"#
        );
    }

    #[test]
    fn test_messages_must_be_an_array() {
        let result = serde_json::from_value::<ChatRequest>(json!({
            "model": "gpt-4",
            "messages": "hi"
        }));
        assert!(result.is_err());
    }
}
