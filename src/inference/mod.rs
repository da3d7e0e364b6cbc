//! Inference: the request/response contract with the hosted language model.
//!
//! This module handles all communication with the model endpoint:
//! - Non-streaming chat completions with automatic tool selection
//! - Response parsing into an ordered list of tool calls
//! - The `ModelOracle` trait the orchestration loop is written against
//!
//! The client speaks the OpenAI Chat Completions API, so the hosted model is
//! interchangeable via config.

pub mod client;
pub mod errors;
pub mod oracle;
pub mod response;
pub mod types;

// Re-exports for convenience
pub use client::InferenceClient;
pub use errors::InferenceError;
pub use oracle::ModelOracle;
pub use types::{AssistantReply, ChatMessage, Role, ToolCall, ToolDefinition};
