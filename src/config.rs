//! Assistant configuration loading and validation.
//!
//! Reads `deskmate.yaml` and resolves environment variables. Config is the
//! single source of truth for the model endpoint, the turn budget and the
//! automation interpreter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::inference::errors::InferenceError;

/// File name searched upward from the working directory.
pub const CONFIG_FILE_NAME: &str = "deskmate.yaml";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "DESKMATE_CONFIG";

/// Default per-query turn budget.
pub const DEFAULT_MAX_TURNS: usize = 5;

// ─── Public Types ────────────────────────────────────────────────────────────

/// A single hosted model's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub display_name: String,
    /// Base URL of the OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Model identifier sent in requests. Defaults to the config key.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Bearer token. Usually `${OPENAI_API_KEY}`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Orchestration loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Maximum model turns per query before `MAX_TURNS_REACHED`.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// How confirmed automation scripts are executed.
#[derive(Debug, Clone, Deserialize)]
pub struct AutomationSettings {
    /// Interpreter binary, e.g. `osascript`.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Arguments placed before the script text, e.g. `["-e"]`.
    #[serde(default = "default_interpreter_args")]
    pub args: Vec<String>,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            args: default_interpreter_args(),
        }
    }
}

/// Top-level configuration (mirrors `deskmate.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub active_model: String,
    pub models: HashMap<String, ModelConfig>,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub automation: AutomationSettings,
}

impl AssistantConfig {
    /// Built-in configuration used when no config file exists.
    ///
    /// Targets the OpenAI API with the key taken from `OPENAI_API_KEY`.
    pub fn builtin() -> Self {
        let mut models = HashMap::new();
        models.insert(
            "gpt-4o-mini".to_string(),
            ModelConfig {
                display_name: "GPT-4o mini".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                model_name: None,
                api_key: std::env::var("OPENAI_API_KEY").ok(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
            },
        );
        Self {
            active_model: "gpt-4o-mini".to_string(),
            models,
            agent: AgentSettings::default(),
            automation: AutomationSettings::default(),
        }
    }
}

fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}
fn default_interpreter() -> String {
    "osascript".to_string()
}
fn default_interpreter_args() -> Vec<String> {
    vec!["-e".to_string()]
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the config file.
///
/// Resolution order: `DESKMATE_CONFIG`, `deskmate.yaml` upward from `start`,
/// then the platform config directory. Returns `None` when nothing exists.
pub fn find_config_path(start: &Path) -> Option<PathBuf> {
    // 1. Check env var
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(path);
        if candidate.is_file() {
            return Some(candidate);
        }
        tracing::warn!(path = %candidate.display(), "{CONFIG_ENV_VAR} does not point at a file");
    }

    // 2. Walk upward from `start`
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    // 3. Platform config dir
    let candidate = dirs::config_dir()?.join("deskmate").join("config.yaml");
    candidate.is_file().then_some(candidate)
}

/// Load and parse the configuration file.
///
/// Performs environment-variable interpolation on string values matching
/// `${VAR_NAME}` or `${VAR_NAME:-default}`.
pub fn load_config(path: &Path) -> Result<AssistantConfig, InferenceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| InferenceError::ConfigError {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;
    parse_config(&raw)
}

/// Parse configuration text (after env interpolation) and validate it.
pub fn parse_config(raw: &str) -> Result<AssistantConfig, InferenceError> {
    let interpolated = interpolate_env_vars(raw);

    let config: AssistantConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| InferenceError::ConfigError {
            reason: format!("failed to parse config: {e}"),
        })?;

    if config.agent.max_turns == 0 {
        return Err(InferenceError::ConfigError {
            reason: "agent.max_turns must be at least 1".into(),
        });
    }
    if config.automation.interpreter.trim().is_empty() {
        return Err(InferenceError::ConfigError {
            reason: "automation.interpreter must not be empty".into(),
        });
    }

    Ok(config)
}

/// Resolve the active model configuration.
///
/// Returns `(model_key, ModelConfig)`.
pub fn resolve_active_model(
    config: &AssistantConfig,
) -> Result<(String, ModelConfig), InferenceError> {
    config
        .models
        .get(&config.active_model)
        .map(|model| (config.active_model.clone(), model.clone()))
        .ok_or_else(|| InferenceError::ConfigError {
            reason: format!(
                "active model '{}' not found in config",
                config.active_model
            ),
        })
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    if let Some(idx) = expr.find(":-") {
        let var_name = &expr[..idx];
        let default = &expr[idx + 2..];
        std::env::var(var_name).unwrap_or_else(|_| expand_tilde(default))
    } else {
        std::env::var(expr).unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
            if let Some(home) = dirs::home_dir() {
                return format!("{}{rest}", home.display());
            }
        }
    }
    path.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
