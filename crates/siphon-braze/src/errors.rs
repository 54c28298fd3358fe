//! Delivery error types and HTTP status classification

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while forwarding an event to Braze
#[derive(Error, Debug)]
pub enum BrazeError {
    /// A required field was absent from the event or the looked-up profile
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transient upstream condition; the host should requeue the event
    /// (reference backoff: up to 9 attempts over 4 hours)
    #[error("Retryable error from {service}: status {status}: {message}")]
    Retryable {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Definite client error; retrying will not help
    #[error("Terminal error from {service}: status {status}: {message}")]
    Terminal {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Event shape that matches none of the dispatch paths
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Network-level failure reaching an upstream service
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BrazeError {
    /// Whether the invoking host should requeue the event for another attempt
    ///
    /// Network-level failures count as retryable: the outbound calls are
    /// idempotent creates/merges, so resending a partially processed event
    /// is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. } | Self::Request(_))
    }
}

/// Disposition of an upstream HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Retryable,
    Terminal,
}

/// Classify an upstream HTTP status code
///
/// 5xx and 429 are transient everywhere. The profile lookup additionally
/// treats 404 as transient (`retry_not_found`): the profile may simply not
/// be indexed yet. Every other 4xx is terminal.
pub fn classify_status(status: StatusCode, retry_not_found: bool) -> StatusClass {
    let code = status.as_u16();
    if code >= 500 || code == 429 || (retry_not_found && code == 404) {
        return StatusClass::Retryable;
    }
    if code >= 400 {
        return StatusClass::Terminal;
    }
    StatusClass::Success
}
