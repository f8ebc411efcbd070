//! Error types for the portal client.
//!
//! # Design
//! The front ends never distinguish transient from permanent failures, so
//! every variant collapses to one flat string via `user_message()`. The
//! variants still carry enough detail (status, body, decode reason) for
//! logging.

use thiserror::Error;

/// Errors produced while building, executing, or parsing portal requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("request failed with HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// A 2xx body did not match the schema of the expected entity.
    #[error("malformed {entity} response: {reason}")]
    MalformedResponse { entity: &'static str, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client-side input checks (route ids, edited word lists, ...).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn malformed(entity: &'static str, err: serde_json::Error) -> Self {
        ApiError::MalformedResponse {
            entity,
            reason: err.to_string(),
        }
    }

    /// The flat message surfaced to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::RequestFailed { .. } => "request failed".to_string(),
            ApiError::MalformedResponse { .. } => "request failed: unexpected response".to_string(),
            ApiError::Serialization(_) => "request failed: could not encode request".to_string(),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Config(msg) => format!("configuration error: {msg}"),
        }
    }
}
