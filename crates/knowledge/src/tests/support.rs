//! Test doubles for the embedding client and the vector store.

use crate::embeddings::EmbeddingGenerator;
use crate::manager::VectorIndexManager;
use crate::sqlite_index::SqliteVectorStore;
use crate::types::{DistanceMetric, Embedding, IndexStats, Metadata};
use crate::vector_index::{QueryHit, QueryRequest, StoreError, VectorStore};
use ragdex_llm::{EmbeddingClient, EmbeddingRequest, EmbeddingResponse, ProviderError, TrigramClient};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Embedding client that replays a script, then falls back to a fixed vector.
#[derive(Debug, Default)]
pub struct StubClient {
    script: Mutex<VecDeque<Result<Embedding, ProviderError>>>,
    fallback: Option<Embedding>,
    requests: Mutex<Vec<EmbeddingRequest>>,
}

impl StubClient {
    /// Always answers with `vector`.
    pub fn fixed(vector: Embedding) -> Self {
        Self {
            fallback: Some(vector),
            ..Default::default()
        }
    }

    /// Fails once with each error in order.
    pub fn failing(errors: Vec<ProviderError>) -> Self {
        Self {
            script: Mutex::new(errors.into_iter().map(Err).collect()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.input.clone()).collect()
    }

    pub fn models(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.model.clone()).collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for StubClient {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let embedding = match next {
            Some(result) => result?,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ProviderError::Other("stub script exhausted".to_string()))?,
        };

        Ok(EmbeddingResponse {
            embedding,
            model: request.model.clone(),
            usage: None,
        })
    }
}

/// Store that fails every operation with the same error.
#[derive(Debug)]
pub struct FailingStore {
    error: StoreError,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(error: StoreError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

#[async_trait::async_trait]
impl VectorStore for FailingStore {
    async fn create_index(&self, _: &str, _: usize, _: DistanceMetric) -> Result<(), StoreError> {
        self.fail()
    }

    async fn upsert(
        &self,
        _: &str,
        _: &[String],
        _: &[Embedding],
        _: &[Metadata],
    ) -> Result<(), StoreError> {
        self.fail()
    }

    async fn query(&self, _: &QueryRequest) -> Result<Vec<QueryHit>, StoreError> {
        self.fail()
    }

    async fn describe_index(&self, _: &str) -> Result<IndexStats, StoreError> {
        self.fail()
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        self.fail()
    }

    async fn delete_index(&self, _: &str) -> Result<(), StoreError> {
        self.fail()
    }
}

/// Store whose queries return a fixed list of hits, unsorted and unfiltered.
#[derive(Debug)]
pub struct CannedStore {
    hits: Vec<QueryHit>,
}

impl CannedStore {
    pub fn new(hits: Vec<QueryHit>) -> Self {
        Self { hits }
    }
}

#[async_trait::async_trait]
impl VectorStore for CannedStore {
    async fn create_index(&self, name: &str, _: usize, _: DistanceMetric) -> Result<(), StoreError> {
        Err(StoreError::AlreadyExists(name.to_string()))
    }

    async fn upsert(
        &self,
        _: &str,
        _: &[String],
        _: &[Embedding],
        _: &[Metadata],
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn query(&self, _: &QueryRequest) -> Result<Vec<QueryHit>, StoreError> {
        Ok(self.hits.clone())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexStats, StoreError> {
        Ok(IndexStats {
            name: name.to_string(),
            dimension: 0,
            metric: DistanceMetric::Cosine,
            count: self.hits.len() as u64,
        })
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    async fn delete_index(&self, _: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A hit without metadata.
pub fn hit(id: &str, score: Option<f32>) -> QueryHit {
    QueryHit {
        id: id.to_string(),
        score,
        metadata: None,
        vector: Some(vec![1.0, 0.0]),
    }
}

/// Trigram generator plus a manager over a fresh in-memory store.
pub fn trigram_parts(dimensions: usize) -> (Arc<EmbeddingGenerator>, Arc<VectorIndexManager>) {
    let generator = EmbeddingGenerator::new(Arc::new(TrigramClient::new(dimensions)), "trigram", dimensions);
    let store = SqliteVectorStore::in_memory().unwrap();
    let manager = VectorIndexManager::new(Arc::new(store), dimensions);
    (Arc::new(generator), Arc::new(manager))
}
