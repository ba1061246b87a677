//! Backend for the Gemini `generateContent` API.
//!
//! [`GeminiBackend`] translates normalized [`GenRequest`]s into
//! `POST /v1beta/models/{model}:generateContent` calls, with the API key
//! passed as a query parameter. When JSON mode is requested the body asks
//! for `responseMimeType: "application/json"`.

use super::{Backend, GenRequest, GenResponse};
use crate::error::Result;
use crate::ScaffoldError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Backend for the hosted Gemini API.
///
/// Endpoint: `/v1beta/models/{model}:generateContent?key=...`.
/// This is the default backend.
#[derive(Debug, Clone, Default)]
pub struct GeminiBackend {
    api_key: Option<String>,
}

impl GeminiBackend {
    /// Create a backend without an API key (for proxies that inject one).
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Create a backend that authenticates with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// Build the `generateContent` request body.
    fn build_body(request: &GenRequest) -> Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(t) = request.config.temperature {
            generation_config.insert("temperature".into(), json!(t));
        }
        if let Some(max) = request.config.max_output_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(max));
        }
        if request.config.json_mode {
            generation_config.insert("responseMimeType".into(), json!("application/json"));
        }

        let mut body = json!({
            "contents": [{
                "parts": [{"text": request.prompt}]
            }]
        });
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }
        body
    }

    /// Parse a Retry-After header value as seconds.
    fn parse_retry_after(value: &str) -> Option<std::time::Duration> {
        // Integer seconds only; HTTP-date values are ignored
        value
            .trim()
            .parse::<u64>()
            .ok()
            .map(std::time::Duration::from_secs)
    }

    /// Pull the generated text out of the first candidate.
    fn extract_text(json_resp: &Value) -> String {
        json_resp
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenRequest,
    ) -> Result<GenResponse> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{}/v1beta/models/{}:generateContent", base, request.model);
        let body = Self::build_body(request);

        let mut req = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.query(&[("key", key.as_str())]);
        }

        // Transport failures stay as `Request` so the retry loop sees them.
        let resp = req.send().await.map_err(ScaffoldError::Request)?;

        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(Self::parse_retry_after);
            let text = resp.text().await.unwrap_or_default();
            return Err(ScaffoldError::HttpError {
                status,
                body: text,
                retry_after,
            });
        }

        let json_resp: Value = resp.json().await?;
        let text = Self::extract_text(&json_resp);
        let metadata = json_resp.get("usageMetadata").cloned();

        Ok(GenResponse {
            text,
            status,
            metadata,
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenConfig;

    fn request(config: GenConfig) -> GenRequest {
        GenRequest {
            model: "gemini-1.5-flash".into(),
            prompt: "Generate the project".into(),
            config,
        }
    }

    #[test]
    fn body_minimal() {
        let body = GeminiBackend::build_body(&request(GenConfig::default()));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Generate the project");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn body_with_full_config() {
        let config = GenConfig::default()
            .with_temperature(0.2)
            .with_max_output_tokens(8192)
            .with_json_mode(true);
        let body = GeminiBackend::build_body(&request(config));
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn retry_after_integer_seconds() {
        assert_eq!(
            GeminiBackend::parse_retry_after("30"),
            Some(std::time::Duration::from_secs(30))
        );
        assert_eq!(
            GeminiBackend::parse_retry_after(" 5 "),
            Some(std::time::Duration::from_secs(5))
        );
        assert_eq!(
            GeminiBackend::parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            None
        );
    }

    #[test]
    fn extract_text_from_candidates() {
        let resp = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"modules\": []}"}]}
            }],
            "usageMetadata": {"totalTokenCount": 42}
        });
        assert_eq!(GeminiBackend::extract_text(&resp), "{\"modules\": []}");
    }

    #[test]
    fn extract_text_missing_candidates_is_empty() {
        let resp = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(GeminiBackend::extract_text(&resp), "");
    }

    #[tokio::test]
    async fn connection_error_is_request_variant_and_retryable() {
        use crate::backend::{is_retryable, BackoffConfig};
        use crate::ScaffoldError;

        // Port 9 (discard) is closed; the connect fails immediately.
        let backend = GeminiBackend::new();
        let client = Client::new();
        let err = backend
            .complete(&client, "http://127.0.0.1:9", &request(GenConfig::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Request(_)));
        assert!(is_retryable(&err, &BackoffConfig::linear()));
    }
}
