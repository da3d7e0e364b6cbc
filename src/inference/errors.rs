//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to build
//! meaningful log entries.

use thiserror::Error;

/// Errors that can occur while talking to the model oracle.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed {
        endpoint: String,
        reason: String,
    },

    /// The model endpoint did not respond within the transport timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout {
        duration_secs: u64,
    },

    /// Non-2xx HTTP response from the model endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        body: String,
    },

    /// The response body did not have the chat-completion shape.
    #[error("malformed model response: {reason}")]
    MalformedResponse {
        reason: String,
    },

    /// Configuration loading or validation error.
    #[error("config error: {reason}")]
    ConfigError {
        reason: String,
    },
}

impl InferenceError {
    /// Whether the endpoint rejected our credentials (HTTP 401/403).
    pub fn is_auth_error(&self) -> bool {
        matches!(self, InferenceError::HttpError { status: 401 | 403, .. })
    }

    /// Whether the endpoint is throttling us (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InferenceError::HttpError { status: 429, .. })
    }

    /// Message shown to the user when this error ends a query.
    pub fn user_message(&self) -> String {
        if self.is_auth_error() {
            return "The model service rejected the API key. Check the api_key setting."
                .to_string();
        }
        if self.is_rate_limited() {
            return "The model service is rate limiting requests. Try again shortly."
                .to_string();
        }
        match self {
            InferenceError::ConnectionFailed { endpoint, .. } => {
                format!("Could not reach the model service at {endpoint}.")
            }
            InferenceError::Timeout { duration_secs } => {
                format!("The model service did not answer within {duration_secs}s.")
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_error() {
        let err = InferenceError::HttpError {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert!(err.is_auth_error());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_is_rate_limited() {
        let err = InferenceError::HttpError {
            status: 429,
            body: "slow down".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(err.user_message().contains("rate limiting"));
    }

    #[test]
    fn test_user_message_connection_failed() {
        let err = InferenceError::ConnectionFailed {
            endpoint: "https://api.example.com/v1/chat/completions".to_string(),
            reason: "dns".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Could not reach the model service at https://api.example.com/v1/chat/completions."
        );
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err = InferenceError::MalformedResponse {
            reason: "empty choices array".to_string(),
        };
        assert_eq!(err.user_message(), "malformed model response: empty choices array");
    }
}
