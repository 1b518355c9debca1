//! Document ingestion and semantic retrieval for ragdex.
//!
//! The building blocks are usable on their own:
//! - [`EmbeddingGenerator`] turns text into vectors through an embedding client
//! - [`VectorIndexManager`] owns index lifecycle, upsert and query over a [`VectorStore`]
//! - [`DocumentIngestionPipeline`] seeds files into an index
//! - [`RetrievalEngine`] answers free-text queries
//!
//! [`KnowledgeBase`] wires them together from an [`AppConfig`].

pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod manager;
pub mod rag;
pub mod sqlite_index;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::EmbeddingGenerator;
pub use error::{RagError, RagResult};
pub use ingest::DocumentIngestionPipeline;
pub use manager::VectorIndexManager;
pub use rag::{RetrievalEngine, SearchOptions, SearchResult};
pub use sqlite_index::SqliteVectorStore;
pub use types::{
    cosine_similarity, DistanceMetric, DocumentEntry, Embedding, IndexSettings, IndexStats,
    IngestStats, Metadata, SeedOptions, SeededDocument,
};
pub use vector_index::{QueryHit, QueryRequest, StoreError, VectorStore};

use ragdex_core::{AppConfig, AppError, AppResult};
use ragdex_llm::{create_client, EmbeddingClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One index, its embedding model and store, ready to seed and search.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    index: IndexSettings,
    manager: Arc<VectorIndexManager>,
    pipeline: DocumentIngestionPipeline,
    engine: RetrievalEngine,
}

impl KnowledgeBase {
    /// Build the provider client and open the store named by `config`.
    ///
    /// Fails before touching the network when the configuration is incomplete.
    pub fn connect(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let settings = &config.embedding;
        let client = create_client(
            &settings.provider,
            settings.endpoint.as_deref(),
            config.api_key.as_deref(),
            settings.dimensions,
        )
        .map_err(|e| AppError::Embedding(format!("Failed to create embedding client: {}", e)))?;

        let url = config.store_url.as_deref().unwrap_or_default();
        let store = SqliteVectorStore::connect(url).map_err(|e| AppError::Store(e.to_string()))?;

        let metric = config.metric.parse::<DistanceMetric>().map_err(AppError::Config)?;
        let index = IndexSettings::new(config.index_name.clone(), settings.dimensions, metric);

        tracing::debug!(
            "Knowledge base: provider={}, model={}, dimensions={}, index={}, store={}",
            settings.provider,
            settings.model,
            settings.dimensions,
            index.name,
            store.location()
        );

        Ok(Self::from_parts(client, Arc::new(store), settings.model.clone(), index)
            .with_base_dir(&config.workspace))
    }

    /// Assemble from explicit collaborators.
    pub fn from_parts(
        client: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        model: impl Into<String>,
        index: IndexSettings,
    ) -> Self {
        let generator = Arc::new(EmbeddingGenerator::new(client, model, index.dimension));
        let manager = Arc::new(VectorIndexManager::new(store, index.dimension));
        let pipeline =
            DocumentIngestionPipeline::new(generator.clone(), manager.clone(), index.clone());
        let engine = RetrievalEngine::new(generator, manager.clone(), index.name.clone());

        Self {
            index,
            manager,
            pipeline,
            engine,
        }
    }

    /// Resolve relative seed paths against `base_dir`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.pipeline = self.pipeline.with_base_dir(base_dir);
        self
    }

    pub fn index(&self) -> &IndexSettings {
        &self.index
    }

    pub fn manager(&self) -> &VectorIndexManager {
        &self.manager
    }

    pub fn pipeline(&self) -> &DocumentIngestionPipeline {
        &self.pipeline
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    /// Seed one file.
    pub async fn seed(&self, options: SeedOptions) -> RagResult<SeededDocument> {
        self.pipeline.seed(options).await
    }

    /// Seed every matching file under a directory.
    pub async fn seed_directory(&self, dir: &Path, extensions: &[String]) -> RagResult<IngestStats> {
        self.pipeline.seed_directory(dir, extensions).await
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> RagResult<Vec<SearchResult>> {
        self.engine.search(query, options).await
    }

    /// Describe the configured index. Missing indexes are reported as empty.
    pub async fn stats(&self) -> RagResult<IndexStats> {
        let exists = self
            .manager
            .list_indexes()
            .await?
            .iter()
            .any(|name| name == &self.index.name);

        if !exists {
            return Ok(IndexStats {
                name: self.index.name.clone(),
                dimension: self.index.dimension,
                metric: self.index.metric,
                count: 0,
            });
        }

        self.manager.describe_index(&self.index.name).await
    }

    /// Delete the configured index and all its documents.
    pub async fn drop_index(&self) -> RagResult<()> {
        self.manager.delete_index(&self.index.name).await
    }
}
