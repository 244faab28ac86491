//! Error types and handling for the search service

use serde::Serialize;
use thiserror::Error;

/// Longest query text accepted from callers
pub const MAX_QUERY_LEN: usize = 500;

/// Application error types
///
/// Only these surface to callers. Per-record anomalies inside the matching
/// core never become an `AppError`.
#[derive(Debug, Error, Serialize)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The table store was unreachable or answered with a failure status
    #[error("Corpus fetch failed: {0}")]
    CorpusFetchFailed(String),
    /// The table store answered with a payload we cannot read
    #[error("Corpus parse failed: {0}")]
    CorpusParseFailed(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::CorpusFetchFailed(_) => "corpus_fetch_failed",
            AppError::CorpusParseFailed(_) => "corpus_parse_failed",
            AppError::Timeout(_) => "timeout",
            AppError::Config(_) => "config_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Process exit code for CLI mode
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) | AppError::Config(_) => 1,
            AppError::CorpusFetchFailed(_) | AppError::CorpusParseFailed(_) => 2,
            AppError::Timeout(_) => 4,
            AppError::Internal(_) => 5,
        }
    }
}

/// Convert anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert reqwest::Error to AppError
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::CorpusParseFailed(err.to_string())
        } else {
            AppError::CorpusFetchFailed(err.to_string())
        }
    }
}

/// Convert serde_json::Error to AppError
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::CorpusParseFailed(err.to_string())
    }
}

/// Convert std::io::Error to AppError
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::CorpusFetchFailed(err.to_string())
    }
}

pub fn validate_query(query: &str) -> Result<(), AppError> {
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(AppError::InvalidInput(format!(
            "Query too long, maximum {} characters",
            MAX_QUERY_LEN
        )));
    }

    Ok(())
}

pub fn validate_threshold(threshold: f64) -> Result<(), AppError> {
    if !threshold.is_finite() {
        return Err(AppError::InvalidInput(
            "Threshold must be a finite number".to_string(),
        ));
    }

    Ok(())
}
