//! Capabilities: the OS operations the model can ask for.
//!
//! - `catalog` advertises them and parses model-issued calls
//! - `applications`, `open`, `search`, `files` are the direct providers
//! - `automation` runs confirmed scripts (gate phase 2 only)
//!
//! Providers never fail the loop: every outcome is a [`CapabilityResult`]
//! that is folded back into the conversation as a tool message.

pub mod applications;
pub mod automation;
pub mod catalog;
pub mod errors;
pub mod files;
pub mod open;
pub mod search;

use async_trait::async_trait;
use serde_json::{json, Value};

pub use automation::{CommandScriptRunner, ScriptOutput, ScriptRunner};
pub use catalog::{Capability, CapabilityCall, DirectCall};
pub use errors::CapabilityError;

use catalog::{OpenPathArgs, ReadFileArgs, SearchFilesArgs};

// ─── CapabilityResult ────────────────────────────────────────────────────────

/// Outcome of one capability invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityResult {
    Success(Value),
    Failure(CapabilityError),
}

impl CapabilityResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CapabilityResult::Success(_))
    }

    /// The JSON value the model sees for this result.
    pub fn to_json(&self) -> Value {
        match self {
            CapabilityResult::Success(value) => value.clone(),
            CapabilityResult::Failure(err) => json!({
                "success": false,
                "error": err.to_string(),
            }),
        }
    }

    /// Serialized tool-message content. Parsing it back yields [`to_json`](Self::to_json).
    pub fn to_tool_content(&self) -> String {
        self.to_json().to_string()
    }
}

impl From<CapabilityError> for CapabilityResult {
    fn from(err: CapabilityError) -> Self {
        CapabilityResult::Failure(err)
    }
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// The direct capabilities. Automation runs only through the confirmation gate.
#[async_trait]
pub trait CapabilityProviders: Send + Sync {
    async fn list_applications(&self) -> CapabilityResult;
    async fn open_path(&self, args: &OpenPathArgs) -> CapabilityResult;
    async fn search_files(&self, args: &SearchFilesArgs) -> CapabilityResult;
    async fn read_file_content(&self, args: &ReadFileArgs) -> CapabilityResult;
}

impl DirectCall {
    /// Exhaustive dispatch to the matching provider.
    pub async fn invoke(&self, providers: &dyn CapabilityProviders) -> CapabilityResult {
        match self {
            DirectCall::ListApplications => providers.list_applications().await,
            DirectCall::OpenPath(args) => providers.open_path(args).await,
            DirectCall::SearchFiles(args) => providers.search_files(args).await,
            DirectCall::ReadFileContent(args) => providers.read_file_content(args).await,
        }
    }
}

/// Providers backed by the local operating system.
#[derive(Debug, Clone, Default)]
pub struct SystemProviders;

#[async_trait]
impl CapabilityProviders for SystemProviders {
    async fn list_applications(&self) -> CapabilityResult {
        let apps = applications::list_applications().await;
        CapabilityResult::Success(json!({
            "count": apps.len(),
            "applications": apps,
        }))
    }

    async fn open_path(&self, args: &OpenPathArgs) -> CapabilityResult {
        match open::open_path(&args.path).await {
            Ok(()) => CapabilityResult::Success(json!({
                "success": true,
                "path": args.path,
            })),
            Err(e) => e.into(),
        }
    }

    async fn search_files(&self, args: &SearchFilesArgs) -> CapabilityResult {
        let files = search::search_files(&args.query).await;
        CapabilityResult::Success(json!({
            "query": args.query,
            "count": files.len(),
            "files": files,
        }))
    }

    async fn read_file_content(&self, args: &ReadFileArgs) -> CapabilityResult {
        match files::read_file_content(&args.path).await {
            Ok(content) => match serde_json::to_value(&content) {
                Ok(value) => CapabilityResult::Success(value),
                Err(e) => CapabilityError::ReadFailed {
                    path: args.path.clone(),
                    reason: e.to_string(),
                }
                .into(),
            },
            Err(e) => e.into(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
