//! Embedding client abstraction and request/response types.
//!
//! This module defines the core abstractions for talking to embedding
//! providers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedding request for a single text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Model identifier (e.g., "text-embedding-3-small")
    pub model: String,

    /// Text to embed
    pub input: String,
}

impl EmbeddingRequest {
    /// Create a new embedding request.
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
        }
    }
}

/// Embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vector
    pub embedding: Vec<f32>,

    /// Model that produced the embedding
    pub model: String,

    /// Token usage, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<EmbeddingUsage>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EmbeddingUsage {
    /// Tokens in the input
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Total tokens billed
    #[serde(default)]
    pub total_tokens: u32,
}

/// Failure reported by an embedding provider.
///
/// Clients tag failures at the point where the most information is
/// available (HTTP status, structured error body). Callers classify on the
/// variant, never on the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The credential is missing, malformed or rejected
    #[error("Invalid API key: {0}")]
    Authentication(String),

    /// The provider throttled the request
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The request never produced an HTTP response (DNS, connect, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Untagged failure
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Tag a failure from an HTTP status and the provider's error message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ProviderError::Authentication(message),
            429 => ProviderError::RateLimited(message),
            _ => match Self::from_message(message) {
                ProviderError::Other(message) => ProviderError::Api { status, message },
                tagged => tagged,
            },
        }
    }

    /// Tag a failure that only carries free text.
    ///
    /// Matching is case-sensitive on "API key" and "rate limit", the
    /// phrasing providers use in their error messages.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("API key") {
            ProviderError::Authentication(message)
        } else if message.contains("rate limit") {
            ProviderError::RateLimited(message)
        } else {
            ProviderError::Other(message)
        }
    }
}

/// Trait for embedding providers.
///
/// One call to [`EmbeddingClient::embed`] is exactly one request to the
/// provider. Implementations do not retry.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync + std::fmt::Debug {
    /// Get the provider name (e.g., "openai", "ollama").
    fn provider_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError>;
}
