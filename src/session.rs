//! Session adapter between a host and the agent core.
//!
//! One session per host. It runs queries through the orchestrator, keeps at
//! most one pending confirmation, and is the only owner of the gate that can
//! execute approved scripts. Methods take `&mut self`, so a session cannot be
//! driven by two queries at once.

use crate::agent_core::{
    AgentError, ConfirmationGate, ConfirmationRequest, ExecutionReport, Orchestrator,
    TerminalOutcome,
};
use crate::capabilities::CapabilityError;
use crate::AssistantContext;

pub struct AssistantSession {
    orchestrator: Orchestrator,
    gate: ConfirmationGate,
    pending: Option<ConfirmationRequest>,
}

impl AssistantSession {
    pub fn new(ctx: &AssistantContext) -> Self {
        Self {
            orchestrator: Orchestrator::new(ctx),
            gate: ConfirmationGate::new(ctx.script_runner.clone()),
            pending: None,
        }
    }

    /// The script currently awaiting approval, if any.
    pub fn pending_confirmation(&self) -> Option<&ConfirmationRequest> {
        self.pending.as_ref()
    }

    /// Run one user utterance to a terminal outcome.
    ///
    /// A new query discards any confirmation still pending from the last one.
    pub async fn submit_query(&mut self, text: &str) -> TerminalOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TerminalOutcome::error(AgentError::EmptyQuery.to_string());
        }

        if let Some(stale) = self.pending.take() {
            tracing::info!(
                request_id = %stale.request_id,
                "session: pending confirmation discarded by new query"
            );
        }

        let outcome = self.orchestrator.run(text).await;
        if let TerminalOutcome::AutomationConfirmationRequired(request) = &outcome {
            self.pending = Some(request.clone());
        }
        outcome
    }

    /// Execute a script the user approved. Bypasses the orchestration loop.
    pub async fn confirm_and_execute(&mut self, script_content: &str) -> ExecutionReport {
        if script_content.trim().is_empty() {
            return ExecutionReport::failed(CapabilityError::EmptyScript.to_string());
        }

        let Some(request) = self.pending.take() else {
            tracing::warn!("session: confirmation received with nothing pending");
            return ExecutionReport::failed(AgentError::NoPendingConfirmation.to_string());
        };

        if request.script_content != script_content {
            tracing::info!(
                request_id = %request.request_id,
                "session: executing script edited by the user"
            );
        }

        tracing::info!(request_id = %request.request_id, "session: script approved");
        self.gate.execute_confirmed(script_content).await
    }

    /// Reject the pending script. No-op when nothing is pending.
    pub fn cancel_confirmation(&mut self) {
        if let Some(request) = self.pending.take() {
            tracing::info!(request_id = %request.request_id, "session: script rejected");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
