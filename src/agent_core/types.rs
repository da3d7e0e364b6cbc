//! Shared types for the Agent Core.
//!
//! These cross the boundary to the session adapter and the host, so they
//! serialize with camelCase field names for display layers.

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ─── Terminal outcome ────────────────────────────────────────────────────────

/// The only values the orchestration loop returns. Exactly one per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminalOutcome {
    /// Final text from the model.
    TextResponse { content: String },
    /// Results of a confirmed automation run, reported back to the host.
    ToolExecuted { results: Vec<ExecutionReport> },
    /// The model proposed a script that needs user approval before it runs.
    AutomationConfirmationRequired(ConfirmationRequest),
    /// Unrecoverable failure for this query.
    Error { message: String },
}

impl TerminalOutcome {
    pub fn text(content: impl Into<String>) -> Self {
        TerminalOutcome::TextResponse {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        TerminalOutcome::Error {
            message: message.into(),
        }
    }

    /// Variant tag, as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            TerminalOutcome::TextResponse { .. } => "text_response",
            TerminalOutcome::ToolExecuted { .. } => "tool_executed",
            TerminalOutcome::AutomationConfirmationRequired(_) => {
                "automation_confirmation_required"
            }
            TerminalOutcome::Error { .. } => "error",
        }
    }
}

// ─── Confirmation ────────────────────────────────────────────────────────────

/// A script awaiting the user's decision.
///
/// Owned by the session until exactly one of execute or discard consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    /// Unique request ID for logs and display.
    pub request_id: String,
    /// The script exactly as the model proposed it.
    pub script_content: String,
    /// RFC 3339 creation time.
    pub requested_at: String,
}

impl ConfirmationRequest {
    pub fn new(script_content: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            script_content: script_content.into(),
            requested_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Result of running a confirmed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error-stream text from a run that otherwise succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ExecutionReport {
    pub fn succeeded(output: impl Into<String>, stderr: Option<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            stderr: stderr.filter(|s| !s.is_empty()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            stderr: None,
        }
    }

    /// Wrap as the outcome hosts render after a confirmed run.
    pub fn into_outcome(self) -> TerminalOutcome {
        TerminalOutcome::ToolExecuted {
            results: vec![self],
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_outcome_serialization() {
        let json = serde_json::to_value(TerminalOutcome::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text_response", "content": "hi"}));
    }

    #[test]
    fn test_confirmation_outcome_uses_camel_case() {
        let outcome =
            TerminalOutcome::AutomationConfirmationRequired(ConfirmationRequest::new("beep"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "automation_confirmation_required");
        assert_eq!(json["scriptContent"], "beep");
        assert!(json.get("requestId").is_some());
        assert!(json.get("requestedAt").is_some());
        assert!(json.get("script_content").is_none());
        assert_eq!(outcome.kind(), "automation_confirmation_required");
    }

    #[test]
    fn test_outcome_deserializes_back() {
        let outcome = TerminalOutcome::error("max turns reached");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: TerminalOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_confirmation_requests_are_unique() {
        let a = ConfirmationRequest::new("beep");
        let b = ConfirmationRequest::new("beep");
        assert_ne!(a.request_id, b.request_id);
        assert!(chrono::DateTime::parse_from_rfc3339(&a.requested_at).is_ok());
    }

    #[test]
    fn test_execution_report_omits_absent_fields() {
        let json = serde_json::to_value(ExecutionReport::failed("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "nope"}));
    }

    #[test]
    fn test_succeeded_drops_empty_stderr() {
        let report = ExecutionReport::succeeded("ok", Some(String::new()));
        assert!(report.stderr.is_none());
        assert_eq!(report.clone().into_outcome().kind(), "tool_executed");
    }
}
