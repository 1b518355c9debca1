//! Document ingestion.
//!
//! Reads a file, embeds its whole content as one vector and upserts it with
//! descriptive metadata. Re-seeding an id replaces the earlier document.

use crate::embeddings::EmbeddingGenerator;
use crate::error::{RagError, RagResult};
use crate::manager::VectorIndexManager;
use crate::types::{IndexSettings, IngestStats, Metadata, SeedOptions, SeededDocument};
use chrono::Utc;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::{DirEntry, WalkDir};

/// Category given to documents seeded without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Seeds documents into one index.
#[derive(Debug, Clone)]
pub struct DocumentIngestionPipeline {
    generator: Arc<EmbeddingGenerator>,
    manager: Arc<VectorIndexManager>,
    index: IndexSettings,
    base_dir: PathBuf,
}

impl DocumentIngestionPipeline {
    /// Relative sources resolve against the current working directory.
    pub fn new(
        generator: Arc<EmbeddingGenerator>,
        manager: Arc<VectorIndexManager>,
        index: IndexSettings,
    ) -> Self {
        Self {
            generator,
            manager,
            index,
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Resolve relative sources against `base_dir` instead.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn index(&self) -> &IndexSettings {
        &self.index
    }

    fn resolve(&self, source: &Path) -> PathBuf {
        if source.is_absolute() {
            source.to_path_buf()
        } else {
            self.base_dir.join(source)
        }
    }

    /// Seed one document.
    ///
    /// The stored metadata starts from `title` (file name), `category`
    /// ("general"), `source` (resolved path) and `content` (file text); the
    /// caller's metadata is merged on top and wins on every key.
    ///
    /// # Errors
    /// - [`RagError::FileNotFound`] when the file does not exist
    /// - [`RagError::InvalidInput`] when it cannot be read as text or is blank
    /// - embedding and store errors as classified by their components
    pub async fn seed(&self, options: SeedOptions) -> RagResult<SeededDocument> {
        self.manager
            .ensure_index(&self.index.name, self.index.dimension, self.index.metric)
            .await?;

        let path = self.resolve(&options.source);
        tracing::debug!("Seeding {:?}", path);

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RagError::FileNotFound(path.display().to_string()),
            _ => RagError::InvalidInput(format!("cannot read {}: {}", path.display(), e)),
        })?;

        let vector = self.generator.generate(&content).await?;

        let id = match options.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => default_id(&path)?,
        };

        let metadata = build_metadata(&path, &content, options.metadata);

        self.manager
            .upsert(&self.index.name, &[id.clone()], &[vector], &[metadata])
            .await?;

        tracing::info!("Seeded '{}' from {:?} ({} bytes)", id, path, content.len());

        Ok(SeededDocument {
            id,
            source: path,
            bytes: content.len() as u64,
            dimensions: self.generator.dimensions(),
            seeded_at: Utc::now(),
        })
    }

    /// Seed every regular file under `dir` whose extension is listed.
    ///
    /// An empty extension list accepts every file. Hidden files and
    /// directories are skipped. A file that fails is logged and counted, and
    /// the walk continues.
    pub async fn seed_directory(&self, dir: &Path, extensions: &[String]) -> RagResult<IngestStats> {
        let start = Instant::now();
        let root = self.resolve(dir);

        if !root.exists() {
            return Err(RagError::FileNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(RagError::InvalidInput(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        tracing::info!("Seeding directory {:?} into '{}'", root, self.index.name);

        let mut stats = IngestStats::default();

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    stats.failed += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() || !matches_extension(entry.path(), extensions) {
                continue;
            }

            match self.seed(SeedOptions::new(entry.path())).await {
                Ok(doc) => {
                    stats.seeded += 1;
                    stats.bytes_processed += doc.bytes;
                }
                Err(e) => {
                    tracing::warn!("Failed to seed {:?}: {}", entry.path(), e);
                    stats.failed += 1;
                }
            }
        }

        stats.duration_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            "Seeded {} documents ({} failed, {} bytes) in {:.2}s",
            stats.seeded,
            stats.failed,
            stats.bytes_processed,
            stats.duration_secs
        );

        Ok(stats)
    }
}

/// File name without its extension.
fn default_id(path: &Path) -> RagResult<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| RagError::InvalidInput(format!("cannot derive an id from {}", path.display())))
}

fn build_metadata(path: &Path, content: &str, overrides: Option<Metadata>) -> Metadata {
    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut metadata = Metadata::new();
    metadata.insert("title".to_string(), Value::String(title));
    metadata.insert("category".to_string(), Value::String(DEFAULT_CATEGORY.to_string()));
    metadata.insert("source".to_string(), Value::String(path.display().to_string()));
    metadata.insert("content".to_string(), Value::String(content.to_string()));

    if let Some(overrides) = overrides {
        if overrides.contains_key("content") {
            tracing::warn!(
                "Caller metadata replaces the stored content of {:?}; search results will not show the file text",
                path
            );
        }
        metadata.extend(overrides);
    }

    metadata
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
