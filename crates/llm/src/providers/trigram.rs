//! Offline embedding provider using hashed character trigrams.

use crate::client::{EmbeddingClient, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage, ProviderError};
use std::collections::{HashMap, HashSet};

/// Words too common to carry meaning.
const STOP_WORDS: [&str; 32] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic, content-aware embeddings without a network call.
///
/// Each word contributes to the buckets of its character trigrams and to
/// one bucket for the whole word; the vector is then L2-normalized. Texts
/// sharing vocabulary score high under cosine similarity. This is not a
/// semantic model, but it is stable across runs and platforms, which makes
/// it useful for tests and for working offline.
#[derive(Debug, Clone)]
pub struct TrigramClient {
    dimensions: usize,
}

impl TrigramClient {
    /// Create a client producing vectors of `dimensions` length.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Length of the produced vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn hash(bytes: &[u8], seed: u64) -> u64 {
        bytes
            .iter()
            .fold(0u64, |acc, b| acc.wrapping_mul(seed).wrapping_add(*b as u64))
    }

    /// Compute the embedding for `text`. Text without any usable word maps
    /// to the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let bucket = (Self::hash(trigram.as_bytes(), 37) as usize) % self.dimensions;
                embedding[bucket] += (*freq as f32).sqrt();
            }

            let bucket = (Self::hash(word.as_bytes(), 31) as usize) % self.dimensions;
            embedding[bucket] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for TrigramClient {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let tokens = request.input.split_whitespace().count() as u32;
        Ok(EmbeddingResponse {
            embedding: self.embed_text(&request.input),
            model: request.model.clone(),
            usage: Some(EmbeddingUsage {
                prompt_tokens: tokens,
                total_tokens: tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_dimensions_and_normalization() {
        let client = TrigramClient::new(384);
        let response = client
            .embed(&EmbeddingRequest::new("trigram-v1", "hello world"))
            .await
            .unwrap();

        assert_eq!(response.embedding.len(), 384);
        let norm: f32 = response.embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_deterministic() {
        let client = TrigramClient::new(64);
        assert_eq!(
            client.embed_text("deterministic test"),
            client.embed_text("deterministic test")
        );
    }

    #[test]
    fn test_punctuation_does_not_split_vocabulary() {
        let client = TrigramClient::new(256);
        let a = client.embed_text("The sky is blue.");
        let b = client.embed_text("sky blue");
        assert!((cosine(&a, &b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let client = TrigramClient::new(512);
        let doc = client.embed_text("Rust is a systems programming language");
        let related = client.embed_text("systems programming in rust");
        let unrelated = client.embed_text("pasta recipes with tomato sauce");
        assert!(cosine(&doc, &related) > cosine(&doc, &unrelated));
    }

    #[test]
    fn test_stop_words_only_is_zero_vector() {
        let client = TrigramClient::new(32);
        assert!(client.embed_text("the and of").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_utf8_safety() {
        let client = TrigramClient::new(128);
        let embedding = client.embed_text("Gamedex é um aplicativo 🎮 brasileiro para gerenciar jogos!");
        assert_eq!(embedding.len(), 128);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}
