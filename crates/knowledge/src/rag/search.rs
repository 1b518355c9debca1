//! Semantic search over a vector index.
//!
//! Embeds the query with the same generator used at ingestion time, asks the
//! index manager for the nearest documents and normalizes their metadata.

use crate::embeddings::EmbeddingGenerator;
use crate::error::{RagError, RagResult};
use crate::manager::VectorIndexManager;
use crate::rag::types::{SearchOptions, SearchResult};
use std::sync::Arc;
use tracing::instrument;

/// Answers free-text queries against one index.
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    generator: Arc<EmbeddingGenerator>,
    manager: Arc<VectorIndexManager>,
    index_name: String,
}

impl RetrievalEngine {
    pub fn new(
        generator: Arc<EmbeddingGenerator>,
        manager: Arc<VectorIndexManager>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            manager,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Search for documents related to `query`.
    ///
    /// Results are sorted by descending score, at most `options.top_k`, each
    /// scoring at least `options.min_score`. No match is an empty list.
    ///
    /// # Errors
    /// - [`RagError::InvalidInput`] for a blank query, `top_k == 0` or a NaN threshold
    /// - embedding errors as classified by [`EmbeddingGenerator::generate`]
    /// - [`RagError::ConnectionError`] / [`RagError::Timeout`] when the store
    ///   is unreachable or slow, [`RagError::GenericSearchFailure`] otherwise
    #[instrument(skip(self, query), fields(index = %self.index_name, top_k = options.top_k))]
    pub async fn search(&self, query: &str, options: &SearchOptions) -> RagResult<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidInput("search query is empty".to_string()));
        }
        if options.top_k == 0 {
            return Err(RagError::InvalidInput("topK must be at least 1".to_string()));
        }
        if options.min_score.is_nan() {
            return Err(RagError::InvalidInput("minScore must be a number".to_string()));
        }

        tracing::debug!("Generating query embedding");
        let vector = self.generator.generate(query).await?;

        let hits = self
            .manager
            .query(&self.index_name, &vector, options.top_k, options.min_score, false)
            .await
            .map_err(classify_search_failure)?;

        if hits.is_empty() {
            tracing::info!("No results found");
            return Ok(Vec::new());
        }

        let results: Vec<SearchResult> = hits.into_iter().map(SearchResult::from).collect();

        tracing::info!(
            "Found {} results (best score {:.3})",
            results.len(),
            results[0].score
        );

        Ok(results)
    }
}

/// Reclassify a failure raised while querying the store.
///
/// Connection and timeout failures keep their class, and any other tagged
/// failure becomes a generic search failure. Only untagged text is inspected.
fn classify_search_failure(err: RagError) -> RagError {
    match err {
        RagError::ConnectionError(_)
        | RagError::Timeout(_)
        | RagError::DimensionMismatch { .. }
        | RagError::GenericSearchFailure(_) => err,
        RagError::Unknown(message) => {
            let lower = message.to_lowercase();
            if lower.contains("connect") {
                RagError::ConnectionError(message)
            } else if lower.contains("timeout") || lower.contains("timed out") {
                RagError::Timeout(message)
            } else {
                RagError::GenericSearchFailure(message)
            }
        }
        RagError::StoreFailure(message)
        | RagError::ValidationError(message)
        | RagError::FileNotFound(message) => RagError::GenericSearchFailure(message),
        other => RagError::GenericSearchFailure(other.to_string()),
    }
}
