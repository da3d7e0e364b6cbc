//! Test doubles for the oracle, the providers and the script runner.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capabilities::catalog::{OpenPathArgs, ReadFileArgs, SearchFilesArgs};
use crate::capabilities::{
    files, CapabilityError, CapabilityProviders, CapabilityResult, ScriptOutput, ScriptRunner,
};
use crate::config::AgentSettings;
use crate::inference::types::{AssistantReply, ChatMessage, ToolCall, ToolDefinition};
use crate::inference::{InferenceError, ModelOracle};
use crate::AssistantContext;

/// Build a tool call with JSON arguments.
pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

pub fn test_context(
    oracle: Arc<dyn ModelOracle>,
    providers: Arc<dyn CapabilityProviders>,
    script_runner: Arc<dyn ScriptRunner>,
    max_turns: usize,
) -> AssistantContext {
    AssistantContext {
        oracle,
        providers,
        script_runner,
        agent: AgentSettings { max_turns },
    }
}

// ─── ScriptedOracle ─────────────────────────────────────────────────────────

/// Replays queued replies in order and records every request.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<AssistantReply, InferenceError>>>,
    /// Returned forever once the queue is empty.
    fallback: Option<AssistantReply>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    tool_names: Mutex<Vec<Vec<String>>>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<AssistantReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<AssistantReply, InferenceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
            tool_names: Mutex::new(Vec::new()),
        }
    }

    /// An oracle that gives the same reply on every turn.
    pub fn repeating(reply: AssistantReply) -> Self {
        Self {
            fallback: Some(reply),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Advertised tool names, per request.
    pub fn tool_names(&self) -> Vec<Vec<String>> {
        self.tool_names.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelOracle for ScriptedOracle {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, InferenceError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.tool_names
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.function.name.clone()).collect());

        let next = self.replies.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(reply), _) => reply,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(InferenceError::MalformedResponse {
                reason: "scripted oracle has no more replies".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

// ─── RecordingProviders ─────────────────────────────────────────────────────

/// Providers that record calls and answer from canned data.
///
/// `readFileContent` goes to the real filesystem so tests can use temp dirs.
#[derive(Default)]
pub struct RecordingProviders {
    calls: Mutex<Vec<String>>,
    applications: Vec<String>,
    search_delays_ms: HashMap<String, u64>,
}

impl RecordingProviders {
    pub fn with_applications(apps: &[&str]) -> Self {
        Self {
            applications: apps.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Make `searchFiles` for `query` take `ms` milliseconds.
    pub fn with_search_delay(mut self, query: &str, ms: u64) -> Self {
        self.search_delays_ms.insert(query.to_string(), ms);
        self
    }

    /// Calls so far, e.g. `"listApplications"` or `"openPath:/tmp"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CapabilityProviders for RecordingProviders {
    async fn list_applications(&self) -> CapabilityResult {
        self.record("listApplications".to_string());
        CapabilityResult::Success(json!({
            "count": self.applications.len(),
            "applications": self.applications,
        }))
    }

    async fn open_path(&self, args: &OpenPathArgs) -> CapabilityResult {
        self.record(format!("openPath:{}", args.path));
        CapabilityResult::Success(json!({"success": true, "path": args.path}))
    }

    async fn search_files(&self, args: &SearchFilesArgs) -> CapabilityResult {
        self.record(format!("searchFiles:{}", args.query));
        if let Some(ms) = self.search_delays_ms.get(&args.query) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        CapabilityResult::Success(json!({
            "query": args.query,
            "count": 1,
            "files": [format!("/tmp/{}", args.query)],
        }))
    }

    async fn read_file_content(&self, args: &ReadFileArgs) -> CapabilityResult {
        self.record(format!("readFileContent:{}", args.path));
        match files::read_file_content(&args.path).await {
            Ok(content) => CapabilityResult::Success(json!(content)),
            Err(e) => e.into(),
        }
    }
}

// ─── RecordingScriptRunner ──────────────────────────────────────────────────

/// Records every script it is asked to run and returns a fixed response.
pub struct RecordingScriptRunner {
    runs: Mutex<Vec<String>>,
    response: Result<ScriptOutput, CapabilityError>,
}

impl RecordingScriptRunner {
    pub fn succeeding(stdout: &str) -> Self {
        Self::with_output(ScriptOutput {
            success: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    pub fn with_output(output: ScriptOutput) -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            response: Ok(output),
        }
    }

    pub fn failing(error: CapabilityError) -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            response: Err(error),
        }
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for RecordingScriptRunner {
    async fn run(&self, script: &str) -> Result<ScriptOutput, CapabilityError> {
        self.runs.lock().unwrap().push(script.to_string());
        self.response.clone()
    }
}
