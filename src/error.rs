//! Error types for the Dojokit CLI

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Dojokit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Platform API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `dojokit init` to set up your API key.")]
    Unauthorized,

    #[error("Access denied. Your role does not permit this operation.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `dojokit init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("API key not configured. Run `dojokit init` to set up your API key.")]
    MissingApiKey,

    #[error(
        "Organization not configured. Pass `--org <ORG_ID>` or run `dojokit init` to pick one."
    )]
    MissingOrgId,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// A failed upstream fetch behind the entity cache.
///
/// Cloneable because a single in-flight request is shared by every caller
/// coalesced onto it. The cache handle turns these into a stale fallback or
/// an error string; they never reach the caller as `Err`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Upstream(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<Error> for FetchError {
    fn from(err: Error) -> Self {
        FetchError::Upstream(err.to_string())
    }
}

/// Rate limiting errors
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Too many requests from {identifier}. Retry after {retry_after_secs}s")]
    Exceeded {
        identifier: String,
        retry_after_secs: u64,
    },

    #[error("Rate limit backend unavailable: {0}")]
    BackendUnavailable(String),
}
