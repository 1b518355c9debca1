//! Ollama embedding provider.
//!
//! Provides embeddings via Ollama's local API using models like
//! `nomic-embed-text` (768 dimensions). No credential is needed.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{EmbeddingClient, EmbeddingRequest, EmbeddingResponse, ProviderError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Ollama API endpoint for embeddings
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request payload for Ollama embeddings API
#[derive(Debug, Clone, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    /// Model name to use
    model: &'a str,
    /// Text to embed
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Debug, Clone, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from Ollama API
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Ollama embedding client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ProviderError::Request(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Ollama reports errors as `{"error": "..."}`; fall back to the raw text.
fn error_from_body(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|response| response.error)
        .unwrap_or_else(|_| body.to_string());
    ProviderError::from_status(status, message)
}

#[async_trait::async_trait]
impl EmbeddingClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(provider = "ollama", model = %request.model, text_len = request.input.len()))]
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let payload = OllamaEmbeddingRequest {
            model: &request.model,
            prompt: &request.input,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_from_body(status.as_u16(), &error_text));
        }

        let body: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(EmbeddingResponse {
            embedding: body.embedding,
            model: request.model.clone(),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new().unwrap();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_custom_base_url() {
        let client = OllamaClient::with_base_url("http://gpu-box:11434/").unwrap();
        assert_eq!(client.base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn test_error_body_parsing() {
        let err = error_from_body(404, r#"{"error":"model \"nomic-embed-text\" not found"}"#);
        assert_eq!(
            err,
            ProviderError::Api {
                status: 404,
                message: "model \"nomic-embed-text\" not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_error() {
        // Port 9 (discard) is closed on any sane test host.
        let client = OllamaClient::with_base_url("http://127.0.0.1:9").unwrap();
        let request = EmbeddingRequest::new("nomic-embed-text", "hello");
        let result = client.embed(&request).await;
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }
}
