//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over generation providers, translating
//! between normalized [`GenRequest`]/[`GenResponse`] types and a
//! provider-specific HTTP API. Built-in implementations: [`GeminiBackend`]
//! for the hosted API, [`MockBackend`] for tests.

pub mod backoff;
pub mod gemini;
pub mod mock;

pub use backoff::{BackoffConfig, DelayGrowth, JitterStrategy};
pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use crate::error::Result;
use crate::ScaffoldError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Type alias for the callback invoked before each transport retry.
///
/// Arguments: `(attempt_number, delay_before_retry, reason_for_retry)`.
pub type RetryCallback<'a> = Option<&'a mut (dyn FnMut(u32, std::time::Duration, &str) + Send)>;

/// A normalized generation request — provider-agnostic.
#[derive(Debug, Clone)]
pub struct GenRequest {
    /// Model identifier (e.g. `"gemini-1.5-flash"`).
    pub model: String,

    /// The full prompt text.
    pub prompt: String,

    /// Sampling and output configuration.
    pub config: GenConfig,
}

/// Generation configuration (temperature, output budget, response format).
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Sampling temperature. `None` uses the provider default.
    pub temperature: Option<f64>,

    /// Maximum output tokens. `None` uses the provider default.
    pub max_output_tokens: Option<u32>,

    /// Ask the provider for a JSON response body. Providers honor this on a
    /// best-effort basis, which is exactly why the repair chain exists.
    pub json_mode: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            temperature: None,
            max_output_tokens: None,
            json_mode: false,
        }
    }
}

impl GenConfig {
    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token budget.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Request a JSON response body from the provider.
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// A normalized generation response.
#[derive(Debug)]
pub struct GenResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics).
    pub status: u16,

    /// Provider-specific metadata (token counts, timing, model info).
    /// Stored as raw JSON — each provider returns different fields.
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over generation providers.
///
/// Implementors translate between the normalized [`GenRequest`]/[`GenResponse`]
/// and the provider's HTTP API.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a generation call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenRequest,
    ) -> Result<GenResponse>;

    /// Human-readable name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Check whether a [`ScaffoldError`] is retryable based on the backoff config.
///
/// Retryable conditions:
/// - [`ScaffoldError::HttpError`] with a status in `config.retryable_statuses`
/// - [`ScaffoldError::Request`] (connection/transport errors)
pub fn is_retryable(error: &ScaffoldError, config: &BackoffConfig) -> bool {
    match error {
        ScaffoldError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        ScaffoldError::Request(_) => true,
        _ => false,
    }
}

/// Execute a backend call with transport-level retry.
///
/// Wraps [`Backend::complete`] with automatic retry on transient failures
/// (429, 5xx, connection errors). The loop is explicitly bounded by
/// `config.max_retries`; there is no recursion and no unbounded waiting.
///
/// Returns the first successful response, or the last error once retries
/// are exhausted. Non-retryable errors return immediately.
///
/// # Arguments
///
/// * `backend` — The generation backend to call
/// * `client` — HTTP client for making requests
/// * `base_url` — Base URL for the API
/// * `request` — The normalized request
/// * `config` — Backoff configuration
/// * `cancel` — Optional cancellation flag, checked before every attempt and after every sleep
/// * `on_retry` — Optional callback invoked before each retry with (attempt, delay, reason)
pub async fn with_backoff(
    backend: &Arc<dyn Backend>,
    client: &Client,
    base_url: &str,
    request: &GenRequest,
    config: &BackoffConfig,
    cancel: Option<&std::sync::atomic::AtomicBool>,
    mut on_retry: RetryCallback<'_>,
) -> Result<GenResponse> {
    let mut last_error: Option<ScaffoldError> = None;

    for attempt in 0..=config.max_retries {
        if let Some(flag) = cancel {
            if flag.load(std::sync::atomic::Ordering::Relaxed) {
                return Err(ScaffoldError::Cancelled);
            }
        }

        // Wait for backoff delay (not on first attempt)
        if attempt > 0 {
            let delay = if let Some(ScaffoldError::HttpError {
                retry_after: Some(ra),
                ..
            }) = &last_error
            {
                if config.respect_retry_after {
                    *ra
                } else {
                    config.delay_for_attempt(attempt - 1)
                }
            } else {
                config.delay_for_attempt(attempt - 1)
            };

            let reason = last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();

            if let Some(ref mut cb) = on_retry {
                cb(attempt, delay, &reason);
            }

            tokio::time::sleep(delay).await;

            // Check cancellation after sleep
            if let Some(flag) = cancel {
                if flag.load(std::sync::atomic::Ordering::Relaxed) {
                    return Err(ScaffoldError::Cancelled);
                }
            }
        }

        match backend.complete(client, base_url, request).await {
            Ok(response) => return Ok(response),
            Err(e) => {
                if attempt < config.max_retries && is_retryable(&e, config) {
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    // Should not reach here, but just in case
    Err(last_error.unwrap_or(ScaffoldError::Other(
        "backoff loop exited unexpectedly".into(),
    )))
}
