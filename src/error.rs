//! Error types for the Librarium application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Error type for catalog API requests.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed (connection, DNS, protocol)
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status code
    #[error("API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The configured base URL is not a valid URL
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest folds timeouts into its general request error;
        // callers need to tell them apart.
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Http(err)
        }
    }
}

/// Error type for normalizing an API response into a candidate record.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The response body isn't valid JSON matching the expected shape
    #[error("Malformed API response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The results list was absent or empty
    #[error("No results found for this title")]
    NoResults,

    /// A required field was missing from an otherwise-parsable result
    #[error("Result is missing required field: {0}")]
    MissingField(&'static str),
}

/// Error type for the persistent catalog store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite operation failed
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Could not create or access the database file
    #[error("Failed to access database file: {0}")]
    Io(#[from] std::io::Error),

    /// A row the store just wrote could not be read back
    #[error("Stored record not found: {0}")]
    MissingRecord(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
