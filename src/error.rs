// src/error.rs

//! Unified error handling for the podium reporter.

use std::fmt;

use thiserror::Error;

/// Result type alias for podium operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regular expression failed to compile
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The results page was served without a valid session
    #[error("Not authenticated at {url}: {reason}")]
    Unauthenticated { url: String, reason: String },

    /// The results page answered with an error status
    #[error("Fetch failed for {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    /// The notification endpoint rejected the summary
    #[error("Delivery failed: HTTP {status} {body}")]
    Delivery { status: u16, body: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authentication error for a fetched URL.
    pub fn unauthenticated(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Unauthenticated {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means the session cookie is missing or stale.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}
