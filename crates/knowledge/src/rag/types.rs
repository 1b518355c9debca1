//! Search request and result types.

use crate::types::Metadata;
use crate::vector_index::QueryHit;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of results returned when the caller does not say.
pub const DEFAULT_TOP_K: usize = 5;

/// Title shown for documents stored without one.
pub const UNTITLED: &str = "Untitled";

/// Options for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Maximum number of results
    pub top_k: usize,

    /// Inclusive lower bound on score
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: 0.0,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

/// One normalized search result.
///
/// `metadata` always holds string values for `title`, `category`, `source`
/// and `content`; any other stored key is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

impl SearchResult {
    pub fn title(&self) -> &str {
        self.text_field("title")
    }

    pub fn category(&self) -> &str {
        self.text_field("category")
    }

    pub fn source(&self) -> &str {
        self.text_field("source")
    }

    pub fn content(&self) -> &str {
        self.text_field("content")
    }

    fn text_field(&self, key: &str) -> &str {
        self.metadata.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<QueryHit> for SearchResult {
    fn from(hit: QueryHit) -> Self {
        let mut metadata = hit.metadata.unwrap_or_default();

        for (key, default) in [
            ("title", UNTITLED),
            ("category", crate::ingest::DEFAULT_CATEGORY),
            ("source", ""),
            ("content", ""),
        ] {
            let value = match metadata.remove(key) {
                None | Some(Value::Null) => Value::String(default.to_string()),
                Some(Value::String(s)) => Value::String(s),
                Some(other) => Value::String(other.to_string()),
            };
            metadata.insert(key.to_string(), value);
        }

        Self {
            id: hit.id,
            score: hit.score.unwrap_or(0.0),
            metadata,
        }
    }
}
