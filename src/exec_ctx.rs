//! Execution context shared across generation calls.
//!
//! [`ExecCtx`] carries the HTTP client, backend, endpoint, cancellation
//! handle, and optional event handler. It is designed to be constructed
//! once and shared across all generations of a scaffolding run.

use crate::backend::{Backend, BackoffConfig, GeminiBackend};
use crate::events::EventHandler;
use reqwest::Client;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Shared execution context for generation calls.
///
/// Carries everything a [`Generator`](crate::generate::Generator) needs from
/// the runtime environment without coupling to any specific caller.
///
/// # Example
///
/// ```
/// use scaffold_pipeline::ExecCtx;
/// use scaffold_pipeline::backend::GeminiBackend;
/// use std::sync::Arc;
///
/// let ctx = ExecCtx::builder()
///     .backend(Arc::new(GeminiBackend::with_api_key("secret")))
///     .build();
/// ```
pub struct ExecCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL for the provider. Default: the hosted Gemini endpoint.
    pub base_url: String,
    /// Generation backend. Default: [`GeminiBackend`].
    pub backend: Arc<dyn Backend>,
    /// Transport retry configuration. Default: [`BackoffConfig::linear()`].
    pub backoff: BackoffConfig,
    /// Optional cancellation flag; checked before every attempt.
    pub cancellation: Option<Arc<AtomicBool>>,
    /// Optional event handler for lifecycle and repair events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder() -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: None,
            backend: None,
            backoff: None,
            cancellation: None,
            event_handler: None,
            timeout: None,
        }
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Return an error if cancellation has been requested.
    pub fn check_cancelled(&self) -> crate::error::Result<()> {
        if self.is_cancelled() {
            return Err(crate::ScaffoldError::Cancelled);
        }
        Ok(())
    }

    /// Get a reference to the cancellation AtomicBool, if set.
    pub fn cancel_flag(&self) -> Option<&AtomicBool> {
        self.cancellation.as_deref()
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("backoff", &self.backoff)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: Option<String>,
    backend: Option<Arc<dyn Backend>>,
    backoff: Option<BackoffConfig>,
    cancellation: Option<Arc<AtomicBool>>,
    event_handler: Option<Arc<dyn EventHandler>>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Override the provider base URL (for proxies or regional endpoints).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the generation backend. Default: [`GeminiBackend`].
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the Gemini backend with API key authentication.
    pub fn gemini_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(GeminiBackend::with_api_key(api_key)));
        self
    }

    /// Set the transport retry configuration. Default: [`BackoffConfig::linear()`].
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = Some(config);
        self
    }

    /// Set the cancellation flag.
    pub fn cancellation(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancellation = cancel;
        self
    }

    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set the request timeout. Default: 60 seconds.
    ///
    /// If no custom `Client` is provided, the built client will use this
    /// timeout. If a custom `Client` is provided via `.client()`, this
    /// setting is ignored (the custom client's own timeout applies).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> ExecCtx {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        };
        let base_url = self
            .base_url
            .as_deref()
            .map(normalize_base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        ExecCtx {
            client,
            base_url,
            backend: self.backend.unwrap_or_else(|| Arc::new(GeminiBackend::new())),
            backoff: self.backoff.unwrap_or_default(),
            cancellation: self.cancellation,
            event_handler: self.event_handler,
        }
    }
}

/// Strip known provider path suffixes from a base URL.
/// This prevents double-pathing when the backend appends its own path.
/// e.g., "https://host/v1beta" -> "https://host"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for suffix in &["/v1beta/models", "/v1beta"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}
