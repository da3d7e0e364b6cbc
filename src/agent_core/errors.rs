//! Agent Core error types.

use thiserror::Error;

/// Errors that can occur during agent core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// A tool message does not answer a call of the preceding assistant message.
    #[error("tool result '{tool_call_id}' violates conversation integrity: {reason}")]
    IntegrityViolation { tool_call_id: String, reason: String },

    /// Utterance was empty or whitespace.
    #[error("query is empty")]
    EmptyQuery,

    /// `confirm_and_execute` was called with nothing awaiting approval.
    #[error("no automation script is awaiting confirmation")]
    NoPendingConfirmation,
}
