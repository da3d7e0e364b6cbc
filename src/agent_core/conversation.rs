//! Conversation: the append-only message log of a single query.
//!
//! A conversation starts as `[system, user]` and only grows. Every tool
//! message must answer a call issued by the assistant message immediately
//! before its block of tool results; appends that would break this are
//! refused and leave the log untouched.

use std::collections::HashSet;

use crate::inference::types::{ChatMessage, Role, ToolCall};

use super::errors::AgentError;

/// A tool result ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResultMessage {
    pub tool_call_id: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_prompt: &str, utterance: &str) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(utterance)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append an assistant turn, carrying its tool calls in model order.
    pub fn push_assistant(&mut self, content: Option<String>, tool_calls: &[ToolCall]) {
        self.messages.push(ChatMessage::assistant(content, tool_calls));
    }

    /// Append a batch of tool results for the most recent assistant message.
    ///
    /// All results are validated before any is appended.
    pub fn push_tool_results(&mut self, results: Vec<ToolResultMessage>) -> Result<(), AgentError> {
        let open_ids: HashSet<String> = self
            .open_tool_call_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut answered: HashSet<String> = self
            .trailing_tool_messages()
            .filter_map(|m| m.tool_call_id.clone())
            .collect();

        for result in &results {
            if !open_ids.contains(&result.tool_call_id) {
                return Err(AgentError::IntegrityViolation {
                    tool_call_id: result.tool_call_id.clone(),
                    reason: "no matching call in the preceding assistant message".to_string(),
                });
            }
            if !answered.insert(result.tool_call_id.clone()) {
                return Err(AgentError::IntegrityViolation {
                    tool_call_id: result.tool_call_id.clone(),
                    reason: "call already has a result".to_string(),
                });
            }
        }

        self.messages.extend(
            results
                .into_iter()
                .map(|r| ChatMessage::tool(r.tool_call_id, r.content)),
        );
        Ok(())
    }

    /// Latest non-blank assistant text, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .find_map(|m| m.content.as_deref().filter(|t| !t.trim().is_empty()))
    }

    /// Check the whole log: every tool message must reference a call of the
    /// assistant message that opens its block.
    pub fn verify_integrity(&self) -> Result<(), AgentError> {
        let mut open: Option<Vec<&str>> = None;
        for message in &self.messages {
            match message.role {
                Role::Assistant => open = Some(message.tool_call_ids()),
                Role::Tool => {
                    let id = message.tool_call_id.as_deref().unwrap_or_default();
                    let known = open.as_ref().is_some_and(|ids| ids.contains(&id));
                    if !known {
                        return Err(AgentError::IntegrityViolation {
                            tool_call_id: id.to_string(),
                            reason: "tool message without a matching preceding call".to_string(),
                        });
                    }
                }
                Role::System | Role::User => open = None,
            }
        }
        Ok(())
    }

    /// Call ids of the assistant message heading the current tool block.
    fn open_tool_call_ids(&self) -> Vec<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role != Role::Tool)
            .filter(|m| m.role == Role::Assistant)
            .map(ChatMessage::tool_call_ids)
            .unwrap_or_default()
    }

    fn trailing_tool_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().rev().take_while(|m| m.role == Role::Tool)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "listApplications".to_string(),
            arguments: "{}".to_string(),
        }
    }

    fn result(id: &str) -> ToolResultMessage {
        ToolResultMessage {
            tool_call_id: id.to_string(),
            content: "{}".to_string(),
        }
    }

    #[test]
    fn test_new_conversation_has_system_and_user() {
        let conv = Conversation::new("sys", "hello");
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[1].content.as_deref(), Some("hello"));
        assert!(conv.verify_integrity().is_ok());
    }

    #[test]
    fn test_results_for_issued_calls_accepted_in_order() {
        let mut conv = Conversation::new("sys", "q");
        conv.push_assistant(None, &[call("a"), call("b")]);
        conv.push_tool_results(vec![result("a"), result("b")]).unwrap();
        assert_eq!(conv.len(), 5);
        assert_eq!(conv.messages()[3].tool_call_id.as_deref(), Some("a"));
        assert_eq!(conv.messages()[4].tool_call_id.as_deref(), Some("b"));
        assert!(conv.verify_integrity().is_ok());
    }

    #[test]
    fn test_unknown_id_rejected_and_nothing_appended() {
        let mut conv = Conversation::new("sys", "q");
        conv.push_assistant(None, &[call("a")]);
        let err = conv
            .push_tool_results(vec![result("a"), result("zzz")])
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::IntegrityViolation { ref tool_call_id, .. } if tool_call_id == "zzz"
        ));
        assert_eq!(conv.len(), 3);
    }

    #[test]
    fn test_result_without_assistant_rejected() {
        let mut conv = Conversation::new("sys", "q");
        assert!(conv.push_tool_results(vec![result("a")]).is_err());
    }

    #[test]
    fn test_results_cannot_answer_an_older_assistant() {
        let mut conv = Conversation::new("sys", "q");
        conv.push_assistant(None, &[call("old")]);
        conv.push_tool_results(vec![result("old")]).unwrap();
        conv.push_assistant(None, &[call("new")]);
        assert!(conv.push_tool_results(vec![result("old")]).is_err());
        conv.push_tool_results(vec![result("new")]).unwrap();
        assert!(conv.verify_integrity().is_ok());
    }

    #[test]
    fn test_duplicate_result_rejected() {
        let mut conv = Conversation::new("sys", "q");
        conv.push_assistant(None, &[call("a")]);
        conv.push_tool_results(vec![result("a")]).unwrap();
        assert!(conv.push_tool_results(vec![result("a")]).is_err());
    }

    #[test]
    fn test_last_assistant_text_skips_blank_turns() {
        let mut conv = Conversation::new("sys", "q");
        conv.push_assistant(Some("Let me look.".to_string()), &[call("a")]);
        conv.push_tool_results(vec![result("a")]).unwrap();
        conv.push_assistant(Some("  ".to_string()), &[call("b")]);
        assert_eq!(conv.last_assistant_text(), Some("Let me look."));
    }
}
