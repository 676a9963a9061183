// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the gateway and the sync/pagination core.

use reqwest::StatusCode;

/// Application error type for every backend interaction.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport failure: no response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its deadline.
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Malformed local input (bad lookback window, bad query).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The response body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// A second poll loop was requested for a job that already has one.
    #[error("Already polling: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Whether the request layer may transparently retry this error.
    ///
    /// Transport failures, timeouts and 5xx responses are retried;
    /// 4xx responses and local errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Network(_) | AppError::Timeout => true,
            AppError::Http { status, .. } => *status >= 500,
            AppError::Validation(_)
            | AppError::Decode(_)
            | AppError::Conflict(_)
            | AppError::Config(_) => false,
        }
    }

    /// Whether this is a 4xx response from the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Http { status, .. } if (400..500).contains(status))
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an HTTP error from a status code and body text.
    pub fn http(status: StatusCode, body: impl Into<String>) -> Self {
        AppError::Http {
            status: status.as_u16(),
            body: body.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
