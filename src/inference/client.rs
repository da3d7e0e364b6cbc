//! OpenAI-compatible inference client.
//!
//! Sends chat completion requests to the hosted model endpoint and parses the
//! assistant turn out of the response. One request per call: failures are
//! surfaced to the caller and never retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::config::{resolve_active_model, AssistantConfig, ModelConfig};

use super::errors::InferenceError;
use super::oracle::ModelOracle;
use super::response::parse_completion_response;
use super::types::{AssistantReply, ChatCompletionRequest, ChatMessage, ToolDefinition};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout.
///
/// Hosted models can take a while on long tool-call conversations; this is a
/// transport guard, not a designed latency contract.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Health checks should answer quickly or be considered down.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// ─── InferenceClient ─────────────────────────────────────────────────────────

/// Client for the hosted LLM endpoint.
pub struct InferenceClient {
    http: HttpClient,
    /// The model key from the config (e.g., "gpt-4o-mini").
    model_key: String,
    /// The model configuration.
    model: ModelConfig,
}

impl InferenceClient {
    /// Create a new inference client for the active model.
    ///
    /// Does NOT check connectivity; that happens on the first request.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, InferenceError> {
        let (key, model) = resolve_active_model(config)?;
        Self::new(key, model)
    }

    /// Create a client pinned to a specific model configuration.
    pub fn new(model_key: String, model: ModelConfig) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: model.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        if model.api_key.as_deref().map_or(true, str::is_empty) {
            tracing::warn!(
                model = %model_key,
                "no api_key configured, requests will be sent unauthenticated"
            );
        }

        Ok(Self {
            http,
            model_key,
            model,
        })
    }

    /// The base URL of the model endpoint.
    pub fn base_url(&self) -> &str {
        &self.model.base_url
    }

    /// The display name of the model.
    pub fn display_name(&self) -> &str {
        &self.model.display_name
    }

    /// Model identifier sent in requests.
    fn request_model_name(&self) -> String {
        self.model
            .model_name
            .clone()
            .unwrap_or_else(|| self.model_key.clone())
    }

    /// Build the request body for a turn.
    fn build_request(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> ChatCompletionRequest {
        let tools = (!tools.is_empty()).then(|| tools.to_vec());
        ChatCompletionRequest {
            model: self.request_model_name(),
            messages: messages.to_vec(),
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
            stream: false,
        }
    }

    /// Attach the bearer token when one is configured.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.model.api_key.as_deref() {
            Some(key) if !key.is_empty() => request.bearer_auth(key),
            _ => request,
        }
    }

    // ─── Chat Completion ─────────────────────────────────────────────────

    /// Send a non-streaming chat completion request.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, InferenceError> {
        let url = format!("{}/chat/completions", self.model.base_url.trim_end_matches('/'));
        let body = self.build_request(messages, tools);

        // Log the request metadata, not the full body
        tracing::info!(
            url = %url,
            model = %body.model,
            message_count = body.messages.len(),
            tool_count = body.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            max_tokens = body.max_tokens,
            "=== LLM REQUEST ==="
        );

        let response = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout {
                        duration_secs: REQUEST_TIMEOUT.as_secs(),
                    }
                } else {
                    InferenceError::ConnectionFailed {
                        endpoint: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| InferenceError::MalformedResponse {
                reason: format!("failed to read response body: {e}"),
            })?;

        let reply = parse_completion_response(&body_text)?;

        tracing::info!(
            text_len = reply.content.as_deref().map(str::len).unwrap_or(0),
            tool_calls = reply.tool_calls.len(),
            finish_reason = ?reply.finish_reason,
            "=== LLM RESPONSE ==="
        );

        Ok(reply)
    }

    // ─── Health Check ────────────────────────────────────────────────────

    /// Check if the model endpoint is reachable and accepts our credentials.
    ///
    /// Lists models instead of running a completion, so no tokens are spent.
    pub async fn health_check(&self) -> Result<bool, InferenceError> {
        let url = format!("{}/models", self.model.base_url.trim_end_matches('/'));

        match self
            .authorize(self.http.get(&url))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl ModelOracle for InferenceClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantReply, InferenceError> {
        self.chat_completion(messages, tools).await
    }

    fn model_name(&self) -> &str {
        self.display_name()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
