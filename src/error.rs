//! Error types for tfcost
//!
//! Library code uses `crate::error::Result<T>` which returns `AnalyzerError`.
//! The binary uses `anyhow::Result<T>` for top-level error handling and maps
//! the structured error back to an exit code (see `exit_codes`).
//!
//! ## Fatal vs per-resource errors
//!
//! - `PlanNotFound`/`MalformedPlan`/`Terraform`: the plan could not be read.
//!   These abort the run before any report is produced.
//! - `Validation`: a command-line argument is out of range.
//! - `Bedrock`/`UnparseableResponse`: a single resource could not be priced.
//!   The analysis logs them and substitutes a zero-cost placeholder.
//!
//! ## Retry Awareness
//!
//! Errors implement `IsRetryable`. Only `Bedrock` errors flagged as transient
//! (throttling, timeouts, dispatch failures) and `Retryable` are retried by
//! `crate::retry`.

use thiserror::Error;

/// Main error type for tfcost
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Terraform plan file not found: {0}")]
    PlanNotFound(String),

    #[error("Malformed Terraform plan {path}: {reason}")]
    MalformedPlan { path: String, reason: String },

    #[error("Terraform CLI error: {0}")]
    Terraform(String),

    #[error("Bedrock error: {message}")]
    Bedrock {
        message: String,
        transient: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unparseable model response for {address}: {reason}")]
    UnparseableResponse { address: String, reason: String },

    #[error("Retryable error (attempt {attempt}/{max_attempts}): {reason}")]
    Retryable {
        attempt: u32,
        max_attempts: u32,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid argument {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Trait for determining if an error is retryable
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for AnalyzerError {
    fn is_retryable(&self) -> bool {
        match self {
            AnalyzerError::Bedrock { transient, .. } => *transient,
            AnalyzerError::Retryable { .. } => true,
            _ => false,
        }
    }
}

impl AnalyzerError {
    pub(crate) fn malformed(path: &std::path::Path, reason: impl Into<String>) -> Self {
        AnalyzerError::MalformedPlan {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}
