//! Chat-completion response parsing.
//!
//! Turns a non-streaming `POST /chat/completions` body into an
//! [`AssistantReply`]. Tool-call arguments are kept as raw JSON text so a
//! single malformed call cannot invalidate the rest of the turn.

use serde::Deserialize;

use super::errors::InferenceError;
use super::types::{AssistantReply, ToolCall};

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<CompletionToolCall>>,
}

#[derive(Deserialize)]
struct CompletionToolCall {
    id: Option<String>,
    function: CompletionFunction,
}

#[derive(Deserialize)]
struct CompletionFunction {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

/// Parse a chat-completion response body.
///
/// Only the first choice is used. An empty `content` string is normalised to
/// `None`; missing or repeated tool-call ids are replaced with `call_<uuid>`.
pub fn parse_completion_response(body: &str) -> Result<AssistantReply, InferenceError> {
    let resp: CompletionResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::MalformedResponse {
            reason: format!("failed to parse completion response: {e}"),
        })?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or(InferenceError::MalformedResponse {
            reason: "empty choices array".into(),
        })?;

    let content = choice.message.content.filter(|c| !c.is_empty());

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id.unwrap_or_default(),
            name: tc.function.name,
            arguments: tc.function.arguments.unwrap_or_default(),
        })
        .collect();

    let finish_reason = if tool_calls.is_empty() {
        choice.finish_reason
    } else {
        Some("tool_calls".into())
    };

    let mut reply = AssistantReply {
        content,
        tool_calls,
        finish_reason,
    };
    reply.ensure_unique_call_ids();
    Ok(reply)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_content() {
        let body = r#"{
            "choices": [{
                "message": {"role": "assistant", "content": "Hello, world!"},
                "finish_reason": "stop"
            }]
        }"#;

        let reply = parse_completion_response(body).unwrap();
        assert_eq!(reply.content.as_deref(), Some("Hello, world!"));
        assert!(reply.tool_calls.is_empty());
        assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_with_tool_calls_in_order() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_a", "type": "function",
                         "function": {"name": "listApplications", "arguments": "{}"}},
                        {"id": "call_b", "type": "function",
                         "function": {"name": "readFileContent", "arguments": "{\"path\": \"/tmp/x\"}"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;

        let reply = parse_completion_response(body).unwrap();
        assert!(reply.content.is_none());
        assert_eq!(reply.tool_calls.len(), 2);
        assert_eq!(reply.tool_calls[0].id, "call_a");
        assert_eq!(reply.tool_calls[1].name, "readFileContent");
        assert_eq!(reply.tool_calls[1].arguments, "{\"path\": \"/tmp/x\"}");
    }

    #[test]
    fn test_malformed_arguments_are_kept_raw() {
        let body = r#"{
            "choices": [{
                "message": {
                    "content": "",
                    "tool_calls": [{"id": "c1", "function": {"name": "openPath", "arguments": "{\"path\": "}}]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;

        let reply = parse_completion_response(body).unwrap();
        assert_eq!(reply.tool_calls[0].arguments, "{\"path\": ");
    }

    #[test]
    fn test_missing_tool_call_id_is_generated() {
        let body = r#"{
            "choices": [{
                "message": {"tool_calls": [{"function": {"name": "listApplications"}}]},
                "finish_reason": "stop"
            }]
        }"#;

        let reply = parse_completion_response(body).unwrap();
        assert!(reply.tool_calls[0].id.starts_with("call_"));
        assert_eq!(reply.tool_calls[0].arguments, "");
        assert_eq!(reply.finish_reason.as_deref(), Some("tool_calls"));
    }

    #[test]
    fn test_repeated_tool_call_id_is_replaced() {
        let body = r#"{
            "choices": [{
                "message": {
                    "tool_calls": [
                        {"id": "call_0", "function": {"name": "listApplications", "arguments": "{}"}},
                        {"id": "call_0", "function": {"name": "searchFiles", "arguments": "{\"query\": \"x\"}"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;

        let reply = parse_completion_response(body).unwrap();
        assert_eq!(reply.tool_calls[0].id, "call_0");
        assert_ne!(reply.tool_calls[1].id, "call_0");
        assert!(reply.tool_calls[1].id.starts_with("call_"));
        assert_eq!(reply.tool_calls[1].name, "searchFiles");
    }

    #[test]
    fn test_empty_content_is_none() {
        let body = r#"{"choices": [{"message": {"content": ""}, "finish_reason": "stop"}]}"#;
        let reply = parse_completion_response(body).unwrap();
        assert!(reply.content.is_none());
    }

    #[test]
    fn test_parse_empty_choices() {
        let result = parse_completion_response(r#"{"choices": []}"#);
        assert!(matches!(result, Err(InferenceError::MalformedResponse { .. })));
    }

    #[test]
    fn test_parse_not_json() {
        let result = parse_completion_response("<html>502 Bad Gateway</html>");
        assert!(result.is_err());
    }
}
