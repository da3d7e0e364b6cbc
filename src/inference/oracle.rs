//! The model oracle seam.
//!
//! The orchestration loop only ever talks to a [`ModelOracle`]. The HTTP
//! [`InferenceClient`](super::InferenceClient) is the production
//! implementation; tests substitute a scripted one.

use async_trait::async_trait;

use super::errors::InferenceError;
use super::types::{AssistantReply, ChatMessage, ToolDefinition};

/// Something that, given the conversation so far and the advertised tools,
/// produces the next assistant turn.
///
/// Implementations must not retry on their own: a failed call is reported
/// to the loop, which ends the query.
#[async_trait]
pub trait ModelOracle: Send + Sync {
    /// Request the next assistant turn. Tool selection is always automatic.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, InferenceError>;

    /// Human-readable name of the model behind this oracle.
    fn model_name(&self) -> &str;
}
