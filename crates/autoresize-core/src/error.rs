//! Error types for the autoresizer.

use thiserror::Error;

/// Result type alias for autoresizer operations.
pub type ResizeResult<T> = Result<T, ResizeError>;

/// Errors that can occur while configuring or running the autoresizer.
///
/// `Config` and `Preflight` only ever surface before the control loop
/// starts. Everything else is raised inside a cycle and is caught at the
/// cycle boundary; whether `Precondition` and `LimitExceeded` end the
/// process is decided by [`crate::GuardPolicy`].
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("instance pre-check failed: {0}")]
    Preflight(String),

    #[error("malformed metric response: {0}")]
    MalformedMetric(String),

    #[error("{operation} failed: {reason}")]
    ProviderQuery {
        operation: &'static str,
        reason: String,
    },

    #[error("instance not eligible for resize: {field} is '{value}'")]
    Precondition { field: &'static str, value: String },

    #[error("target volume size {target} bytes exceeds limit {limit} bytes")]
    LimitExceeded { target: u64, limit: u64 },

    #[error("resize request from {current} to {target} bytes failed: {reason}")]
    ResizeRequest {
        current: u64,
        target: u64,
        reason: String,
    },
}

impl ResizeError {
    /// Shorthand for a failed provider call.
    pub fn query(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderQuery {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether this error can only happen before the control loop starts.
    pub fn is_startup(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Preflight(_))
    }

    /// Whether this error is a decision-time guard rejection.
    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Self::Precondition { .. } | Self::LimitExceeded { .. })
    }

    /// Stable short name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Preflight(_) => "preflight",
            Self::MalformedMetric(_) => "malformed_metric",
            Self::ProviderQuery { .. } => "provider_query",
            Self::Precondition { .. } => "precondition",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::ResizeRequest { .. } => "resize_request",
        }
    }
}
