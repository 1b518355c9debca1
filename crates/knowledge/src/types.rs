//! Retrieval system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A fixed-length embedding vector.
pub type Embedding = Vec<f32>;

/// Open document metadata. Recognized keys are `title`, `category`,
/// `source` and `content`; any other key is carried through untouched.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Similarity metric an index is created with.
///
/// Scores are oriented so that higher always means more similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity, in [-1, 1]
    #[default]
    Cosine,
    /// Raw inner product
    DotProduct,
    /// `1 / (1 + euclidean distance)`, in (0, 1]
    Euclidean,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::DotProduct => "dotproduct",
            DistanceMetric::Euclidean => "euclidean",
        }
    }

    /// Similarity of two equal-length vectors under this metric.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::DotProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            DistanceMetric::Euclidean => {
                let distance = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f32>()
                    .sqrt();
                1.0 / (1.0 + distance)
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ragdex_core::config::canonical_metric(s) {
            Some("cosine") => Ok(DistanceMetric::Cosine),
            Some("dotproduct") => Ok(DistanceMetric::DotProduct),
            Some("euclidean") => Ok(DistanceMetric::Euclidean),
            _ => Err(format!("Unknown similarity metric: {}", s)),
        }
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Zero vectors have no direction; their similarity to anything is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Where documents live: index name, vector length and metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
}

impl IndexSettings {
    pub fn new(name: impl Into<String>, dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric,
        }
    }
}

/// A document ready to be written: id, vector and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: String,
    pub vector: Embedding,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Description of an existing index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
    /// Number of documents stored
    pub count: u64,
}

/// Options for a single-document ingestion.
#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// File to read, absolute or relative to the pipeline's base directory
    pub source: PathBuf,

    /// Explicit document id; defaults to the file stem
    pub id: Option<String>,

    /// Metadata merged over the computed defaults
    pub metadata: Option<Metadata>,
}

impl SeedOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Report of one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededDocument {
    /// Id the document was stored under
    pub id: String,

    /// Resolved path that was read
    pub source: PathBuf,

    /// Size of the content in bytes
    pub bytes: u64,

    /// Length of the stored embedding
    pub dimensions: usize,

    pub seeded_at: DateTime<Utc>,
}

/// Statistics from a directory ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Documents written
    pub seeded: u32,

    /// Files that failed and were skipped
    pub failed: u32,

    /// Total bytes of seeded content
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}
