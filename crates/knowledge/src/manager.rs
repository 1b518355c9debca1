//! Vector index management.
//!
//! [`VectorIndexManager`] sits between the pipeline/engine and a
//! [`VectorStore`]. It validates batches before they reach the store, makes
//! index creation idempotent, and re-applies the ordering, limit and
//! threshold guarantees on whatever the store returns.

use crate::error::{RagError, RagResult};
use crate::types::{DistanceMetric, DocumentEntry, Embedding, IndexStats, Metadata};
use crate::vector_index::{QueryHit, QueryRequest, StoreError, VectorStore};
use std::cmp::Ordering;
use std::sync::Arc;

/// Index lifecycle, upsert and query over one store.
#[derive(Debug, Clone)]
pub struct VectorIndexManager {
    store: Arc<dyn VectorStore>,
    dimension: usize,
}

impl VectorIndexManager {
    /// `dimension` is the vector length every stored and queried vector must have.
    pub fn new(store: Arc<dyn VectorStore>, dimension: usize) -> Self {
        Self { store, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Make sure `name` exists. Creating an index that already exists with
    /// the same settings succeeds.
    pub async fn ensure_index(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> RagResult<()> {
        if name.trim().is_empty() {
            return Err(RagError::ValidationError("index name is empty".to_string()));
        }
        if dimension == 0 {
            return Err(RagError::ValidationError(
                "index dimension must be greater than 0".to_string(),
            ));
        }

        match self.store.create_index(name, dimension, metric).await {
            Ok(()) => {
                tracing::info!("Created index '{}' ({} dims, {})", name, dimension, metric);
                Ok(())
            }
            Err(StoreError::AlreadyExists(_)) => {
                tracing::debug!("Index '{}' already exists", name);
                Ok(())
            }
            Err(e) => Err(RagError::StoreFailure(e.to_string())),
        }
    }

    /// Write a batch of parallel ids, vectors and metadata.
    ///
    /// Ids already present are replaced. An empty batch is a no-op.
    pub async fn upsert(
        &self,
        index_name: &str,
        ids: &[String],
        vectors: &[Embedding],
        metadata: &[Metadata],
    ) -> RagResult<()> {
        if ids.len() != vectors.len() || ids.len() != metadata.len() {
            return Err(RagError::ValidationError(format!(
                "ids, vectors and metadata must have equal length (got {}, {}, {})",
                ids.len(),
                vectors.len(),
                metadata.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }

        if ids.is_empty() {
            return Ok(());
        }

        self.store.upsert(index_name, ids, vectors, metadata).await?;
        Ok(())
    }

    /// Write prepared entries.
    pub async fn upsert_entries(&self, index_name: &str, entries: &[DocumentEntry]) -> RagResult<()> {
        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        let vectors: Vec<Embedding> = entries.iter().map(|e| e.vector.clone()).collect();
        let metadata: Vec<Metadata> = entries.iter().map(|e| e.metadata.clone()).collect();
        self.upsert(index_name, &ids, &vectors, &metadata).await
    }

    /// Nearest-neighbour search.
    ///
    /// Hits come back sorted by descending score, at most `top_k`, every one
    /// scoring at least `min_score`. A hit without a score counts as 0.
    pub async fn query(
        &self,
        index_name: &str,
        vector: &[f32],
        top_k: usize,
        min_score: f32,
        include_vector: bool,
    ) -> RagResult<Vec<QueryHit>> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let request = QueryRequest {
            index_name: index_name.to_string(),
            vector: vector.to_vec(),
            top_k,
            min_score,
            include_vector,
        };

        let mut hits = self.store.query(&request).await?;

        hits.retain(|hit| hit.score.unwrap_or(0.0) >= min_score);
        hits.sort_by(|a, b| {
            let a_score = a.score.unwrap_or(0.0);
            let b_score = b.score.unwrap_or(0.0);
            b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
        });
        hits.truncate(top_k);

        if !include_vector {
            for hit in &mut hits {
                hit.vector = None;
            }
        }

        Ok(hits)
    }

    pub async fn describe_index(&self, name: &str) -> RagResult<IndexStats> {
        Ok(self.store.describe_index(name).await?)
    }

    pub async fn list_indexes(&self) -> RagResult<Vec<String>> {
        Ok(self.store.list_indexes().await?)
    }

    pub async fn delete_index(&self, name: &str) -> RagResult<()> {
        self.store.delete_index(name).await?;
        Ok(())
    }
}
