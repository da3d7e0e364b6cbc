//! Agent Core: the orchestration layer of Deskmate.
//!
//! Submodules:
//! - `conversation`: Append-only message log with referential integrity
//! - `confirmation`: Two-phase gate for automation scripts
//! - `orchestrator`: The bounded model/tool loop
//! - `prompt`: System prompt construction
//! - `types`: Terminal outcomes, confirmation requests, execution reports
//! - `errors`: Agent-level error types

pub mod confirmation;
pub mod conversation;
pub mod errors;
pub mod orchestrator;
pub mod prompt;
pub mod types;

// Re-exports for convenience
pub use confirmation::{ConfirmationGate, GateDecision};
pub use conversation::Conversation;
pub use errors::AgentError;
pub use orchestrator::{LoopReport, Orchestrator, TerminalState};
pub use types::{ConfirmationRequest, ExecutionReport, TerminalOutcome};
