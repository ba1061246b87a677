use std::time::Duration;
use thiserror::Error;

use crate::mermaid::DiagramSyntaxError;

/// Errors produced by the scaffolding pipeline and its components.
///
/// Note the deliberate asymmetry: malformed JSON output from the model is
/// never an error (it degrades through the repair chain to defaults), while
/// transport failures and malformed diagrams surface here.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A generation task failed with a descriptive message.
    #[error("Generation '{name}' failed: {message}")]
    Generation { name: String, message: String },

    /// A diagram failed structural validation.
    #[error("Diagram validation failed: {0}")]
    Diagram(#[from] DiagramSyntaxError),

    /// The request was cancelled via the cancellation flag.
    #[error("Generation was cancelled")]
    Cancelled,

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations when
    /// the provider returns a non-success status code. The `retry_after`
    /// field is populated from the `Retry-After` response header when present.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ScaffoldError {
    fn from(err: anyhow::Error) -> Self {
        ScaffoldError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
