//! OpenAI embedding provider.
//!
//! API reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::client::{EmbeddingClient, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage, ProviderError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default API base URL.
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request payload for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

/// Response from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
    model: String,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// OpenAI embedding client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// API base URL, without trailing slash
    base_url: String,

    /// Bearer credential
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public API.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_OPENAI_URL, api_key)
    }

    /// Create a client against a custom base URL (proxies, Azure-style gateways).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::Authentication(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

/// Turn a non-success response body into a tagged error.
fn error_from_body(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<OpenAiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());
    ProviderError::from_status(status, message)
}

/// Pull the single embedding out of a successful response.
fn parse_response(body: OpenAiEmbeddingResponse) -> Result<EmbeddingResponse, ProviderError> {
    let embedding = body
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or_else(|| ProviderError::InvalidResponse("response contained no embedding".to_string()))?;

    Ok(EmbeddingResponse {
        embedding,
        model: body.model,
        usage: body.usage,
    })
}

#[async_trait::async_trait]
impl EmbeddingClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(provider = "openai", model = %request.model, text_len = request.input.len()))]
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let payload = OpenAiEmbeddingRequest {
            model: &request.model,
            input: &request.input,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("Failed to send request to OpenAI: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_from_body(status.as_u16(), &body));
        }

        let body: OpenAiEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e)))?;

        let parsed = parse_response(body)?;
        debug!("OpenAI returned {} dimensional embedding", parsed.embedding.len());
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let result = OpenAiClient::new("  ");
        assert!(matches!(result, Err(ProviderError::Authentication(_))));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiClient::with_base_url("http://localhost:8080/v1/", "sk-test").unwrap();
        assert_eq!(client.embeddings_url(), "http://localhost:8080/v1/embeddings");
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_error_body_unauthorized() {
        let body = r#"{"error":{"message":"Incorrect API key provided: sk-bad","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        match error_from_body(401, body) {
            ProviderError::Authentication(message) => {
                assert!(message.starts_with("Incorrect API key provided"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_body_rate_limited() {
        let body = r#"{"error":{"message":"Rate limit reached for requests","type":"requests"}}"#;
        assert!(matches!(error_from_body(429, body), ProviderError::RateLimited(_)));
    }

    #[test]
    fn test_error_body_plain_text() {
        let err = error_from_body(503, "Service Unavailable");
        assert_eq!(
            err,
            ProviderError::Api {
                status: 503,
                message: "Service Unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_parse_response() {
        let body: OpenAiEmbeddingResponse = serde_json::from_str(
            r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,-0.2,0.3]}],"model":"text-embedding-3-small","usage":{"prompt_tokens":2,"total_tokens":2}}"#,
        )
        .unwrap();

        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed.embedding, vec![0.1, -0.2, 0.3]);
        assert_eq!(parsed.model, "text-embedding-3-small");
        assert_eq!(parsed.usage.unwrap().total_tokens, 2);
    }

    #[test]
    fn test_parse_response_without_data() {
        let body: OpenAiEmbeddingResponse =
            serde_json::from_str(r#"{"data":[],"model":"text-embedding-3-small"}"#).unwrap();
        assert!(matches!(
            parse_response(body),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
