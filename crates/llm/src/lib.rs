//! Embedding provider clients for ragdex.
//!
//! This crate wraps the HTTP APIs that turn text into embedding vectors
//! behind a single trait, [`EmbeddingClient`]. Every client reports failures
//! as a tagged [`ProviderError`] so callers can tell credential problems and
//! rate limiting apart from everything else without parsing messages.
//!
//! # Providers
//! - **OpenAI**: `text-embedding-3-*` models (default)
//! - **Ollama**: local models such as `nomic-embed-text`
//! - **Trigram**: deterministic offline embeddings for tests and air-gapped use
//!
//! # Example
//! ```no_run
//! use ragdex_llm::{create_client, EmbeddingRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("openai", None, Some("sk-..."), 1536)?;
//! let request = EmbeddingRequest::new("text-embedding-3-small", "Hello, world!");
//! let response = client.embed(&request).await?;
//! println!("{} dimensions", response.embedding.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{EmbeddingClient, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage, ProviderError};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient, TrigramClient};
