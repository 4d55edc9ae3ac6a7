//! # Structured Error Handling
//!
//! Central error taxonomy for the relay core. Every component reports through
//! [`RelayError`] so callers can distinguish terminal configuration problems
//! from transient backend failures that the resilience layer may retry.

use std::time::Duration;

/// Errors surfaced by the relay core.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Unknown or soft-deleted service, configuration or mapping target.
    /// Terminal for the call, never retried.
    #[error("not found: {0}")]
    NotFound(String),

    /// Parameter mismatch, malformed mapping or malformed cron expression.
    /// Terminal, surfaced to the caller.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Timeout or transient connectivity failure. Eligible for retry.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The circuit breaker for a backend target is open; the call was
    /// rejected without an attempt.
    #[error("{target} is temporarily unavailable (circuit open)")]
    CircuitOpen { target: String },

    /// The retry budget was exhausted without a successful attempt.
    #[error("retries exhausted after {attempts} attempt(s): {message}")]
    RetryExhausted { attempts: u32, message: String },

    /// The per-call global timeout elapsed before an attempt could succeed.
    #[error("global timeout of {global_timeout:?} exceeded for {operation}")]
    GlobalTimeout {
        operation: String,
        global_timeout: Duration,
    },

    /// A continuation hop failed after its own retries; only that hop's
    /// branch is aborted.
    #[error("continuation into '{service}' failed: {message}")]
    ChainAborted { service: String, message: String },

    /// Malformed or unusable configuration (bad connection descriptor,
    /// unsupported provider, invalid identifier). Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// JSON serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    /// Whether the resilience layer may retry this failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, RelayError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RelayError::NotFound(_))
    }

    /// Shorthand used by the execution strategies when classifying
    /// backend failures.
    pub fn transient(message: impl Into<String>) -> Self {
        RelayError::Transient(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
