//! Embedding client factory.
//!
//! Builds the right [`EmbeddingClient`] for a provider name. The caller owns
//! the returned client and shares it for the life of the process.

use crate::client::EmbeddingClient;
use crate::providers::{OllamaClient, OpenAiClient, TrigramClient};
use std::sync::Arc;

/// Create an embedding client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama", "trigram")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by "openai")
/// * `dimensions` - Vector length, used by providers that choose it locally
///
/// # Errors
/// Returns error if the provider is unknown, a required secret is missing,
/// or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    dimensions: usize,
) -> Result<Arc<dyn EmbeddingClient>, String> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(url, api_key),
                None => OpenAiClient::new(api_key),
            }
            .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            }
            .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        "trigram" => Ok(Arc::new(TrigramClient::new(dimensions))),
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, 768).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, 768);
        assert!(client.is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None, 1536) {
            Err(err) => assert!(err.contains("OpenAI provider requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_create_openai_client() {
        let client = create_client("OpenAI", None, Some("sk-test"), 1536).unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_create_trigram_client() {
        let client = create_client("trigram", None, None, 384).unwrap();
        assert_eq!(client.provider_name(), "trigram");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, 384) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
