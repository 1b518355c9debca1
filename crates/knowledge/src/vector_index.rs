//! Vector store abstraction.
//!
//! Defines the operations ragdex needs from a vector store and the tagged
//! error a store reports. The SQLite backend lives in `sqlite_index`.

use crate::types::{DistanceMetric, Embedding, IndexStats, Metadata};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a vector store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Creation was requested for an index that exists with identical settings
    #[error("index \"{0}\" already exists")]
    AlreadyExists(String),

    #[error("index \"{0}\" does not exist")]
    IndexNotFound(String),

    /// The store could not be reached or opened
    #[error("failed to connect to vector store: {0}")]
    Connection(String),

    /// The store did not answer in time (including lock contention)
    #[error("vector store operation timeout: {0}")]
    Timeout(String),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Anything else the backend reports
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    /// Tag a failure that only carries free text.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("already exists") {
            StoreError::AlreadyExists(message)
        } else if lower.contains("connect") {
            StoreError::Connection(message)
        } else if lower.contains("timeout") || lower.contains("timed out") {
            StoreError::Timeout(message)
        } else {
            StoreError::Backend(message)
        }
    }
}

/// Nearest-neighbour query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub index_name: String,
    pub vector: Embedding,
    /// Maximum number of hits
    pub top_k: usize,
    /// Inclusive lower bound on score
    pub min_score: f32,
    /// Return stored vectors with the hits
    pub include_vector: bool,
}

/// One raw hit as returned by a store.
///
/// Stores may omit the score or the metadata; callers normalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub id: String,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Embedding>,
}

/// Trait for vector store backends.
///
/// Implementations must:
/// - report an existing index on creation as [`StoreError::AlreadyExists`]
///   only when dimension and metric match
/// - replace vector and metadata of an existing id atomically on upsert
/// - return query hits sorted by descending score, at most `top_k`, all with
///   score >= `min_score`
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Create a named index with a fixed dimension and metric.
    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), StoreError>;

    /// Insert or replace entries keyed by id. The three slices are parallel.
    async fn upsert(
        &self,
        index_name: &str,
        ids: &[String],
        vectors: &[Embedding],
        metadata: &[Metadata],
    ) -> Result<(), StoreError>;

    /// Search for the nearest entries to `request.vector`.
    async fn query(&self, request: &QueryRequest) -> Result<Vec<QueryHit>, StoreError>;

    /// Describe an index.
    async fn describe_index(&self, name: &str) -> Result<IndexStats, StoreError>;

    /// Names of all indexes.
    async fn list_indexes(&self) -> Result<Vec<String>, StoreError>;

    /// Delete an index and everything stored in it.
    async fn delete_index(&self, name: &str) -> Result<(), StoreError>;
}
