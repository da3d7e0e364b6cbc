//! Orchestration loop: one user utterance in, one terminal outcome out.
//!
//! States:
//! 1. **AwaitingModel**: send the conversation and the catalog to the oracle
//! 2. **DispatchingTools**: run the batch of tool calls the model issued
//! 3. **Terminal**: text done, confirmation interrupt, error, or max turns
//!
//! Direct capabilities in a batch run concurrently and their results are
//! appended in model order. An automation call stops the batch: nothing after
//! it is dispatched, nothing from the batch is folded back, and the script is
//! handed to the caller for confirmation. This loop cannot execute scripts;
//! it only ever calls the gate's validation phase.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::capabilities::catalog::{self, CapabilityCall, DirectCall};
use crate::capabilities::{CapabilityError, CapabilityProviders, CapabilityResult};
use crate::inference::types::{AssistantReply, ToolCall};
use crate::inference::ModelOracle;
use crate::AssistantContext;

use super::confirmation::{ConfirmationGate, GateDecision};
use super::conversation::{Conversation, ToolResultMessage};
use super::prompt::build_system_prompt;
use super::types::{ConfirmationRequest, TerminalOutcome};

/// Error text when the turn budget runs out with nothing to show.
pub const MAX_TURNS_MESSAGE: &str = "max turns reached";

/// Error text when a batch produced no results and the model said nothing.
pub const NO_USABLE_RESULTS_MESSAGE: &str =
    "The model requested tools but none could be run, and it gave no answer.";

// ─── Types ──────────────────────────────────────────────────────────────────

/// Which terminal state the loop stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    TextDone,
    ConfirmInterrupt,
    Error,
    MaxTurnsReached,
}

enum LoopState {
    AwaitingModel { turn: usize },
    DispatchingTools { turn: usize, reply: AssistantReply },
    Terminal { state: TerminalState, outcome: TerminalOutcome },
}

impl LoopState {
    fn terminal(state: TerminalState, outcome: TerminalOutcome) -> Self {
        LoopState::Terminal { state, outcome }
    }
}

/// Everything a finished run leaves behind. The conversation is discarded by
/// normal callers; tests inspect it.
#[derive(Debug)]
pub struct LoopReport {
    pub outcome: TerminalOutcome,
    pub state: TerminalState,
    /// Model calls made.
    pub turns: usize,
    pub conversation: Conversation,
}

/// One dispatched call's result.
#[derive(Debug, Clone)]
struct DispatchedResult {
    tool_call_id: String,
    result: CapabilityResult,
    /// True only when a provider actually ran.
    invoked: bool,
}

/// A batch entry after resolution, before execution.
enum PlannedCall {
    Direct { id: String, call: DirectCall },
    Rejected { id: String, name: String, error: CapabilityError },
}

enum BatchOutcome {
    Completed(Vec<DispatchedResult>),
    Interrupted(ConfirmationRequest),
}

// ─── Orchestrator ───────────────────────────────────────────────────────────

pub struct Orchestrator {
    oracle: Arc<dyn ModelOracle>,
    providers: Arc<dyn CapabilityProviders>,
    max_turns: usize,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(ctx: &AssistantContext) -> Self {
        Self {
            oracle: Arc::clone(&ctx.oracle),
            providers: Arc::clone(&ctx.providers),
            max_turns: ctx.agent.max_turns.max(1),
            system_prompt: build_system_prompt(),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Run a query to its terminal outcome.
    pub async fn run(&self, utterance: &str) -> TerminalOutcome {
        self.run_with_report(utterance).await.outcome
    }

    /// Run a query and keep the final conversation and terminal state.
    pub async fn run_with_report(&self, utterance: &str) -> LoopReport {
        let mut conversation = Conversation::new(&self.system_prompt, utterance);
        let mut turns = 0usize;
        let mut state = LoopState::AwaitingModel { turn: 0 };

        tracing::info!(
            model = %self.oracle.model_name(),
            max_turns = self.max_turns,
            utterance_len = utterance.len(),
            "orchestrator: query started"
        );

        loop {
            state = match state {
                LoopState::AwaitingModel { turn } if turn >= self.max_turns => {
                    tracing::warn!(turns, "orchestrator: turn budget exhausted");
                    let outcome = match conversation.last_assistant_text() {
                        Some(text) => TerminalOutcome::text(text),
                        None => TerminalOutcome::error(MAX_TURNS_MESSAGE),
                    };
                    LoopState::terminal(TerminalState::MaxTurnsReached, outcome)
                }

                LoopState::AwaitingModel { turn } => {
                    turns += 1;
                    let tools = catalog::describe();
                    match self.oracle.complete(conversation.messages(), &tools).await {
                        Err(e) => {
                            tracing::warn!(turn, error = %e, "orchestrator: oracle call failed");
                            LoopState::terminal(
                                TerminalState::Error,
                                TerminalOutcome::error(e.user_message()),
                            )
                        }
                        Ok(reply) if !reply.has_tool_calls() => {
                            let text = reply.content.clone().unwrap_or_default();
                            conversation.push_assistant(reply.content, &[]);
                            LoopState::terminal(
                                TerminalState::TextDone,
                                TerminalOutcome::text(text),
                            )
                        }
                        Ok(mut reply) => {
                            tracing::info!(
                                turn,
                                tool_calls = reply.tool_calls.len(),
                                "orchestrator: model requested tools"
                            );
                            let renamed = reply.ensure_unique_call_ids();
                            if renamed > 0 {
                                tracing::warn!(
                                    turn,
                                    renamed,
                                    "orchestrator: repeated tool call ids reassigned"
                                );
                            }
                            conversation.push_assistant(reply.content.clone(), &reply.tool_calls);
                            LoopState::DispatchingTools { turn, reply }
                        }
                    }
                }

                LoopState::DispatchingTools { turn, reply } => {
                    match self.dispatch_batch(&reply.tool_calls).await {
                        BatchOutcome::Interrupted(request) => LoopState::terminal(
                            TerminalState::ConfirmInterrupt,
                            TerminalOutcome::AutomationConfirmationRequired(request),
                        ),
                        BatchOutcome::Completed(results) => {
                            let invoked = results.iter().filter(|r| r.invoked).count();
                            let messages = results
                                .into_iter()
                                .map(|r| ToolResultMessage {
                                    tool_call_id: r.tool_call_id,
                                    content: r.result.to_tool_content(),
                                })
                                .collect();

                            if let Err(e) = conversation.push_tool_results(messages) {
                                tracing::error!(error = %e, "orchestrator: conversation integrity");
                                LoopState::terminal(
                                    TerminalState::Error,
                                    TerminalOutcome::error(e.to_string()),
                                )
                            } else if invoked == 0 {
                                // Nothing ran; the model gets no new information by looping.
                                match reply.non_empty_text() {
                                    Some(text) => LoopState::terminal(
                                        TerminalState::TextDone,
                                        TerminalOutcome::text(text),
                                    ),
                                    None => LoopState::terminal(
                                        TerminalState::Error,
                                        TerminalOutcome::error(NO_USABLE_RESULTS_MESSAGE),
                                    ),
                                }
                            } else {
                                LoopState::AwaitingModel { turn: turn + 1 }
                            }
                        }
                    }
                }

                LoopState::Terminal { state, outcome } => {
                    tracing::info!(
                        state = ?state,
                        outcome = outcome.kind(),
                        turns,
                        "orchestrator: query finished"
                    );
                    return LoopReport {
                        outcome,
                        state,
                        turns,
                        conversation,
                    };
                }
            };
        }
    }

    /// Resolve a batch in model order, stopping at the first gated call.
    fn plan_batch(calls: &[ToolCall]) -> (Vec<PlannedCall>, Option<ConfirmationRequest>) {
        let mut planned = Vec::with_capacity(calls.len());

        for (idx, tc) in calls.iter().enumerate() {
            let rejected = |error: CapabilityError| PlannedCall::Rejected {
                id: tc.id.clone(),
                name: tc.name.clone(),
                error,
            };

            match CapabilityCall::parse(&tc.name, &tc.arguments) {
                Err(e) => planned.push(rejected(e)),
                Ok(CapabilityCall::Direct(call)) => planned.push(PlannedCall::Direct {
                    id: tc.id.clone(),
                    call,
                }),
                Ok(CapabilityCall::Automation(args)) => {
                    match ConfirmationGate::request_confirmation(&args.script_content) {
                        GateDecision::NeedsConfirmation(request) => {
                            let skipped = calls.len() - idx - 1;
                            if skipped > 0 {
                                tracing::info!(
                                    skipped,
                                    "orchestrator: later calls in batch abandoned for confirmation"
                                );
                            }
                            return (planned, Some(request));
                        }
                        GateDecision::Rejected(e) => planned.push(rejected(e)),
                    }
                }
            }
        }

        (planned, None)
    }

    async fn dispatch_batch(&self, calls: &[ToolCall]) -> BatchOutcome {
        let (planned, interrupt) = Self::plan_batch(calls);
        let providers = self.providers.as_ref();

        let results = join_all(planned.into_iter().map(|p| async move {
            match p {
                PlannedCall::Rejected { id, name, error } => {
                    tracing::warn!(
                        tool = %name,
                        error = %error,
                        "orchestrator: tool call rejected"
                    );
                    DispatchedResult {
                        tool_call_id: id,
                        result: CapabilityResult::Failure(error),
                        invoked: false,
                    }
                }
                PlannedCall::Direct { id, call } => {
                    let start = Instant::now();
                    let result = call.invoke(providers).await;
                    tracing::info!(
                        tool = call.capability().name(),
                        success = result.is_success(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "orchestrator: tool executed"
                    );
                    DispatchedResult {
                        tool_call_id: id,
                        result,
                        invoked: true,
                    }
                }
            }
        }))
        .await;

        match interrupt {
            Some(request) => {
                if !results.is_empty() {
                    tracing::info!(
                        discarded = results.len(),
                        "orchestrator: results before confirmation interrupt discarded"
                    );
                }
                BatchOutcome::Interrupted(request)
            }
            None => BatchOutcome::Completed(results),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
