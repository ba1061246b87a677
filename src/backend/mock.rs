//! Mock backend for testing without a live provider.
//!
//! [`MockBackend`] returns pre-configured responses in order, and can be
//! told to fail its first N calls with an HTTP status, allowing
//! deterministic tests of the retry path.
//!
//! # Example
//!
//! ```
//! use scaffold_pipeline::backend::MockBackend;
//!
//! let mock = MockBackend::new().with_response(r#"{"modules": []}"#);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, GenRequest, GenResponse};
use crate::error::Result;
use crate::ScaffoldError;

/// A test backend that returns canned responses in order.
///
/// Cycles back to the beginning when all responses have been consumed.
/// With [`with_failures`](MockBackend::with_failures), the first N calls
/// return an HTTP error instead, which exercises the backoff loop.
#[derive(Debug)]
pub struct MockBackend {
    responses: Vec<String>,
    index: AtomicUsize,
    failures_remaining: AtomicUsize,
    failure_status: u16,
}

impl MockBackend {
    /// Create a mock backend. Without configured responses it returns `{}`.
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            index: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            failure_status: 503,
        }
    }

    /// Append a canned response. Responses are returned in order and cycle
    /// when exhausted.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.responses.push(response.into());
        self
    }

    /// Append several canned responses at once.
    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses.extend(responses.into_iter().map(Into::into));
        self
    }

    /// Fail the first `count` calls with the given HTTP status before
    /// serving canned responses.
    pub fn with_failures(self, count: usize, status: u16) -> Self {
        self.failures_remaining.store(count, Ordering::Relaxed);
        Self {
            failure_status: status,
            ..self
        }
    }

    fn next_response(&self) -> String {
        if self.responses.is_empty() {
            return "{}".to_string();
        }
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        self.responses[idx].clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        _request: &GenRequest,
    ) -> Result<GenResponse> {
        let remaining = self.failures_remaining.load(Ordering::Relaxed);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::Relaxed);
            return Err(ScaffoldError::HttpError {
                status: self.failure_status,
                body: "mock failure".into(),
                retry_after: None,
            });
        }
        Ok(GenResponse {
            text: self.next_response(),
            status: 200,
            metadata: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
