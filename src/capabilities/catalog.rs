//! Tool catalog: the closed set of capabilities advertised to the model.
//!
//! The catalog does two jobs:
//! - `describe()` renders the capability list as OpenAI tool definitions.
//! - `CapabilityCall::parse` turns a model-issued `(name, raw_arguments)` pair
//!   into a typed call, or a structured error for that call alone.
//!
//! Dispatch is an exhaustive match over [`CapabilityCall`]; the only place a
//! name can fail to resolve is `parse`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::expand_tilde;
use crate::inference::types::{FunctionDefinition, ToolDefinition};

use super::errors::CapabilityError;

// ─── Capability ──────────────────────────────────────────────────────────────

/// Every capability the assistant can offer the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ListApplications,
    OpenPath,
    SearchFiles,
    ReadFileContent,
    RunAutomationScript,
}

impl Capability {
    /// Advertisement order.
    pub const ALL: [Capability; 5] = [
        Capability::ListApplications,
        Capability::OpenPath,
        Capability::SearchFiles,
        Capability::ReadFileContent,
        Capability::RunAutomationScript,
    ];

    /// Wire name used in tool definitions and tool calls.
    pub fn name(self) -> &'static str {
        match self {
            Capability::ListApplications => "listApplications",
            Capability::OpenPath => "openPath",
            Capability::SearchFiles => "searchFiles",
            Capability::ReadFileContent => "readFileContent",
            Capability::RunAutomationScript => "runAutomationScript",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Capability::ListApplications => {
                "List the applications installed on this computer. Takes no arguments."
            }
            Capability::OpenPath => {
                "Open a file, folder, application bundle or URL with its default handler. \
                 Use absolute paths; '~' expands to the user's home directory."
            }
            Capability::SearchFiles => {
                "Search indexed files by name or content using the system search index. \
                 Returns at most 20 absolute paths."
            }
            Capability::ReadFileContent => {
                "Read a text file. Returns at most 5000 characters; longer files are truncated."
            }
            Capability::RunAutomationScript => {
                "Propose an AppleScript that automates an application, for example opening a \
                 new browser tab. The script is shown to the user and only runs after they \
                 approve it; its output is not returned to you."
            }
        }
    }

    /// JSON schema of this capability's arguments.
    pub fn parameters_schema(self) -> Value {
        match self {
            Capability::ListApplications => json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
            Capability::OpenPath => json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Absolute path or URL to open"
                    }
                },
                "required": ["path"]
            }),
            Capability::SearchFiles => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search terms, e.g. a file name or phrase"
                    }
                },
                "required": ["query"]
            }),
            Capability::ReadFileContent => json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Absolute path of the file to read"
                    }
                },
                "required": ["path"]
            }),
            Capability::RunAutomationScript => json!({
                "type": "object",
                "properties": {
                    "scriptContent": {
                        "type": "string",
                        "description": "Complete AppleScript source to run"
                    }
                },
                "required": ["scriptContent"]
            }),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            r#type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

/// The catalog as sent to the model on every turn.
pub fn describe() -> Vec<ToolDefinition> {
    Capability::ALL.into_iter().map(Capability::definition).collect()
}

// ─── Typed arguments ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenPathArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchFilesArgs {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
}

/// Arguments of the gated capability. Emptiness is checked by the gate, not here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutomationScriptArgs {
    #[serde(rename = "scriptContent", alias = "script_content", alias = "script")]
    pub script_content: String,
}

/// A capability that runs as soon as the model asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectCall {
    ListApplications,
    OpenPath(OpenPathArgs),
    SearchFiles(SearchFilesArgs),
    ReadFileContent(ReadFileArgs),
}

impl DirectCall {
    pub fn capability(&self) -> Capability {
        match self {
            DirectCall::ListApplications => Capability::ListApplications,
            DirectCall::OpenPath(_) => Capability::OpenPath,
            DirectCall::SearchFiles(_) => Capability::SearchFiles,
            DirectCall::ReadFileContent(_) => Capability::ReadFileContent,
        }
    }
}

/// A validated, typed tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCall {
    Direct(DirectCall),
    /// Must go through the confirmation gate; never invoked directly.
    Automation(AutomationScriptArgs),
}

impl CapabilityCall {
    /// Resolve a model-issued call.
    ///
    /// Empty argument text is treated as `{}` (models commonly send that for
    /// argument-less tools). Leading `~` in path arguments is expanded.
    pub fn parse(name: &str, raw_arguments: &str) -> Result<Self, CapabilityError> {
        let capability =
            Capability::from_name(name).ok_or_else(|| CapabilityError::UnknownCapability {
                name: name.to_string(),
            })?;

        let value = parse_arguments_object(capability, raw_arguments)?;

        let call = match capability {
            Capability::ListApplications => CapabilityCall::Direct(DirectCall::ListApplications),
            Capability::OpenPath => {
                let mut args: OpenPathArgs = decode(capability, value)?;
                args.path = expand_tilde(require_operand(capability, "path", &args.path)?);
                CapabilityCall::Direct(DirectCall::OpenPath(args))
            }
            Capability::SearchFiles => {
                let args: SearchFilesArgs = decode(capability, value)?;
                require_operand(capability, "query", &args.query)?;
                CapabilityCall::Direct(DirectCall::SearchFiles(args))
            }
            Capability::ReadFileContent => {
                let mut args: ReadFileArgs = decode(capability, value)?;
                args.path = expand_tilde(require_operand(capability, "path", &args.path)?);
                CapabilityCall::Direct(DirectCall::ReadFileContent(args))
            }
            Capability::RunAutomationScript => {
                CapabilityCall::Automation(decode(capability, value)?)
            }
        };

        Ok(call)
    }

    pub fn capability(&self) -> Capability {
        match self {
            CapabilityCall::Direct(call) => call.capability(),
            CapabilityCall::Automation(_) => Capability::RunAutomationScript,
        }
    }
}

fn invalid(capability: Capability, reason: impl Into<String>) -> CapabilityError {
    CapabilityError::InvalidArguments {
        capability: capability.name().to_string(),
        reason: reason.into(),
    }
}

fn parse_arguments_object(capability: Capability, raw: &str) -> Result<Value, CapabilityError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| invalid(capability, format!("arguments are not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(invalid(capability, "arguments must be a JSON object"));
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(capability: Capability, value: Value) -> Result<T, CapabilityError> {
    serde_json::from_value(value).map_err(|e| invalid(capability, e.to_string()))
}

/// Rejects blank values and values that a command-line tool would read as an
/// option. The value itself is passed through unchanged.
fn require_operand<'a>(
    capability: Capability,
    field: &str,
    value: &'a str,
) -> Result<&'a str, CapabilityError> {
    if value.trim().is_empty() {
        return Err(invalid(capability, format!("'{field}' must not be empty")));
    }
    if value.starts_with('-') {
        return Err(invalid(capability, format!("'{field}' must not start with '-'")));
    }
    Ok(value)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
