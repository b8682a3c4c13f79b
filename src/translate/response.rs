use super::nim_types::NimResponse;
use super::openai_types::{zero_usage, ChatChoice, ChatResponse, ResponseMessage};
use crate::error::{ProxyError, Result};
use serde_json::Value;

/// Translate a NIM chat completion into the caller-facing response.
/// Pure function: `original_model` is what the caller originally requested.
pub fn nim_to_openai(resp: &NimResponse, original_model: &str) -> ChatResponse {
    let choices = resp
        .choices
        .iter()
        .map(|c| ChatChoice {
            index: c.index.clone(),
            message: ResponseMessage {
                role: or_default(&c.message.role, "assistant"),
                content: or_default(&c.message.content, ""),
            },
            finish_reason: c.finish_reason.clone(),
        })
        .collect();

    ChatResponse {
        id: completion_id(),
        object: "chat.completion".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: original_model.to_string(),
        choices,
        usage: resp
            .usage
            .clone()
            .filter(|u| !u.is_null())
            .unwrap_or_else(zero_usage),
    }
}

// Null, absent and empty-string values take the fallback.
fn or_default(value: &Value, fallback: &str) -> Value {
    match value {
        Value::Null => Value::from(fallback),
        Value::String(s) if s.is_empty() => Value::from(fallback),
        other => other.clone(),
    }
}

/// Parse a raw upstream body and translate it.
pub fn parse_nim_response(body: &str, original_model: &str) -> Result<ChatResponse> {
    let resp: NimResponse = serde_json::from_str(body).map_err(|e| {
        ProxyError::upstream_format(format!("{}. Body: {}", e, truncate(body, 300)))
    })?;
    Ok(nim_to_openai(&resp, original_model))
}

/// Fresh response id; never the upstream's.
pub fn completion_id() -> String {
    format!("chatcmpl-{}", uuid::Uuid::new_v4().simple())
}

pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_text_response() {
        let body = json!({
            "id": "upstream-id",
            "object": "chat.completion",
            "model": "deepseek-ai/deepseek-v3.2",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!", "reasoning_content": "hmm"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        })
        .to_string();

        let result = parse_nim_response(&body, "gpt-4").unwrap();

        assert_eq!(result.model, "gpt-4");
        assert_eq!(result.object, "chat.completion");
        assert!(result.id.starts_with("chatcmpl-"));
        assert_ne!(result.id, "upstream-id");
        assert_eq!(result.choices.len(), 1);
        assert_eq!(result.choices[0].message.role, "assistant");
        assert_eq!(result.choices[0].message.content, "Hello!");
        assert_eq!(result.choices[0].finish_reason, "stop");
        assert_eq!(result.usage["total_tokens"], 30);

        let wire = serde_json::to_value(&result).unwrap();
        assert!(wire["choices"][0]["message"].get("reasoning_content").is_none());
    }

    #[test]
    fn test_choices_keep_index_and_finish_reason() {
        let body = json!({
            "choices": [
                {"index": 1, "message": {"role": "assistant"}, "finish_reason": "length"},
                {"index": 0, "message": {"role": "assistant", "content": "b"}, "finish_reason": null}
            ]
        })
        .to_string();

        let result = parse_nim_response(&body, "claude-sonnet").unwrap();

        assert_eq!(result.choices[0].index, 1);
        assert_eq!(result.choices[0].message.content, "");
        assert_eq!(result.choices[0].finish_reason, "length");
        assert_eq!(result.choices[1].index, 0);
        assert_eq!(result.choices[1].finish_reason, Value::Null);
    }

    #[test]
    fn test_missing_usage_is_zero_filled() {
        let body = json!({"choices": []}).to_string();
        let result = parse_nim_response(&body, "gpt-4").unwrap();

        let wire = serde_json::to_value(&result.usage).unwrap();
        assert_eq!(
            wire,
            json!({"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0})
        );
    }

    #[test]
    fn test_usage_passes_through_verbatim() {
        let usage = json!({
            "prompt_tokens": null,
            "completion_tokens": 2,
            "total_tokens": "3",
            "reasoning_tokens": 7
        });
        let body = json!({"choices": [], "usage": usage.clone()}).to_string();

        let result = parse_nim_response(&body, "gpt-4").unwrap();
        assert_eq!(result.usage, usage);
    }

    #[test]
    fn test_unusual_field_types_are_not_fatal() {
        let body = json!({
            "choices": [{
                "index": "0",
                "message": {"role": null, "content": [{"type": "text", "text": "hi"}]},
                "finish_reason": {"type": "stop", "stop": "\n"}
            }],
            "usage": null
        })
        .to_string();

        let result = parse_nim_response(&body, "gpt-4").unwrap();
        let choice = &result.choices[0];
        assert_eq!(choice.index, "0");
        assert_eq!(choice.message.role, "assistant");
        assert_eq!(choice.message.content, json!([{"type": "text", "text": "hi"}]));
        assert_eq!(choice.finish_reason, json!({"type": "stop", "stop": "\n"}));
        assert_eq!(result.usage["total_tokens"], 0);
    }

    #[test]
    fn test_missing_choices_is_format_error() {
        let err = parse_nim_response(r#"{"object":"chat.completion"}"#, "gpt-4").unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamFormat { .. }));

        let err = parse_nim_response("<html>bad gateway</html>", "gpt-4").unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamFormat { .. }));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(completion_id(), completion_id());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
