// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
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

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// URL did not match any known platform pattern
    #[error("Unsupported social media URL or invalid format: {0}")]
    Classification(String),

    /// API credential for a platform is not configured
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    /// Provider answered with a non-success HTTP status
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// Provider answered 200 but reported an error in the payload
    #[error("Provider error for {context}: {message}")]
    Provider { context: String, message: String },

    /// Requested item does not exist at the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation is not available for this platform
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Table sink failure
    #[error("Sink error: {0}")]
    Sink(String),

    /// Background job failed to complete
    #[error("Job error: {0}")]
    Job(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a classification error for the given URL.
    pub fn classification(url: impl Into<String>) -> Self {
        Self::Classification(url.into())
    }

    /// Create a provider error with context.
    pub fn provider(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Provider {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a sink error.
    pub fn sink(message: impl fmt::Display) -> Self {
        Self::Sink(message.to_string())
    }

    /// Whether the error comes from missing configuration rather than the provider.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey(_) | Self::Config(_))
    }
}
