//! Embedding generation.
//!
//! Wraps an [`EmbeddingClient`] with the model name and the vector length
//! every index in this process expects.

use crate::error::{RagError, RagResult};
use crate::types::Embedding;
use ragdex_llm::{EmbeddingClient, EmbeddingRequest};
use std::sync::Arc;
use tracing::instrument;

/// Turns text into fixed-length vectors with one configured model.
#[derive(Debug, Clone)]
pub struct EmbeddingGenerator {
    client: Arc<dyn EmbeddingClient>,
    model: String,
    dimensions: usize,
}

impl EmbeddingGenerator {
    pub fn new(client: Arc<dyn EmbeddingClient>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimensions,
        }
    }

    /// Length of every vector this generator returns.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Embed a single text.
    ///
    /// Makes exactly one provider call for non-empty input and none for
    /// empty or whitespace-only input.
    ///
    /// # Errors
    /// - [`RagError::InvalidInput`] for blank text
    /// - [`RagError::AuthenticationError`] / [`RagError::RateLimited`] /
    ///   [`RagError::ProviderFailure`] as classified from the provider
    /// - [`RagError::DimensionMismatch`] when the provider returns a vector
    ///   of the wrong length
    #[instrument(skip(self, text), fields(provider = %self.client.provider_name(), bytes = text.len()))]
    pub async fn generate(&self, text: &str) -> RagResult<Embedding> {
        if text.trim().is_empty() {
            return Err(RagError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let request = EmbeddingRequest::new(self.model.clone(), text);
        let response = self.client.embed(&request).await.map_err(|e| {
            tracing::warn!("Embedding request failed: {}", e);
            RagError::from(e)
        })?;

        if response.embedding.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: response.embedding.len(),
            });
        }

        if let Some(usage) = &response.usage {
            tracing::debug!("Embedding used {} tokens", usage.total_tokens);
        }

        Ok(response.embedding)
    }
}
