//! Error types for draftloop
//!
//! Centralized error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

use crate::domain::Role;

/// All error types that can occur in a draftloop run
#[derive(Debug, Error)]
pub enum DraftloopError {
    /// A participant named a peer that is not the valid next-in-turn role
    #[error("Misrouted directive from {from}: '{target}' is not a valid next participant")]
    MisroutedDirective { from: Role, target: String },

    /// A round completed without handing off or terminating
    #[error("Missing directive: {0} neither handed off nor terminated")]
    MissingDirective(Role),

    /// A round asked to hand off and terminate at the same time
    #[error("Conflicting directives: {0} both handed off and terminated")]
    ConflictingDirectives(Role),

    /// Invalid state transition or operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The caller's request cannot start a run
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model invocation failed
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Prompt template could not be registered or rendered
    #[error("Template error: {0}")]
    Template(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DraftloopError {
    /// Control-flow faults raised by a participant breaking the turn contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DraftloopError::MisroutedDirective { .. }
                | DraftloopError::MissingDirective(_)
                | DraftloopError::ConflictingDirectives(_)
        )
    }
}

/// Errors that can occur while invoking the model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("Mock script exhausted after {0} responses")]
    ScriptExhausted(usize),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::MissingApiKey { .. } => false,
            LlmError::ScriptExhausted(_) => false,
        }
    }
}

/// Result type alias for draftloop operations
pub type Result<T> = std::result::Result<T, DraftloopError>;
