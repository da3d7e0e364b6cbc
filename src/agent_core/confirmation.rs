//! Confirmation gate for automation scripts.
//!
//! Phase 1 ([`ConfirmationGate::request_confirmation`]) is a pure associated
//! function: it validates and packages a script and can never run it. The
//! orchestration loop only ever calls phase 1.
//!
//! Phase 2 ([`ConfirmationGate::execute_confirmed`]) needs a gate instance,
//! which holds the script runner. Only the session owns one.

use std::sync::Arc;

use crate::capabilities::{CapabilityError, ScriptRunner};

use super::types::{ConfirmationRequest, ExecutionReport};

/// Result of phase 1.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// The script is well-formed and must be shown to the user.
    NeedsConfirmation(ConfirmationRequest),
    /// The script failed pre-validation; report it like any tool error.
    Rejected(CapabilityError),
}

pub struct ConfirmationGate {
    runner: Arc<dyn ScriptRunner>,
}

impl ConfirmationGate {
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self { runner }
    }

    /// Phase 1: validate and package. Never executes anything.
    pub fn request_confirmation(script_content: &str) -> GateDecision {
        if script_content.trim().is_empty() {
            return GateDecision::Rejected(CapabilityError::EmptyScript);
        }
        let request = ConfirmationRequest::new(script_content);
        tracing::info!(
            request_id = %request.request_id,
            script_len = script_content.len(),
            "automation script requires confirmation"
        );
        GateDecision::NeedsConfirmation(request)
    }

    /// Phase 2: run a script the user approved.
    pub async fn execute_confirmed(&self, script_content: &str) -> ExecutionReport {
        if script_content.trim().is_empty() {
            return ExecutionReport::failed(CapabilityError::EmptyScript.to_string());
        }

        match self.runner.run(script_content).await {
            Ok(out) if out.success => ExecutionReport::succeeded(out.stdout, Some(out.stderr)),
            Ok(out) => {
                let error = if !out.stderr.is_empty() {
                    out.stderr
                } else {
                    match out.exit_code {
                        Some(code) => format!("Script exited with status {code}"),
                        None => "Script was terminated by a signal".to_string(),
                    }
                };
                ExecutionReport {
                    success: false,
                    output: (!out.stdout.is_empty()).then_some(out.stdout),
                    error: Some(error),
                    stderr: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmed script could not be run");
                ExecutionReport::failed(e.to_string())
            }
        }
    }
}
