//! SQLite-backed vector store.
//!
//! Vectors are stored as little-endian `f32` blobs next to their JSON
//! metadata; queries scan the index and rank in process. Suitable for
//! document collections in the tens of thousands.

use crate::types::{DistanceMetric, Embedding, IndexStats, Metadata};
use crate::vector_index::{QueryHit, QueryRequest, StoreError, VectorStore};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Connection string for a private in-memory database.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// How long a statement waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS vector_indexes (
        name TEXT PRIMARY KEY,
        dimension INTEGER NOT NULL,
        metric TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS vectors (
        index_name TEXT NOT NULL,
        id TEXT NOT NULL,
        embedding BLOB NOT NULL,
        metadata TEXT NOT NULL,
        PRIMARY KEY (index_name, id),
        FOREIGN KEY (index_name) REFERENCES vector_indexes(name) ON DELETE CASCADE
    );
"#;

#[derive(Debug, Clone, PartialEq)]
enum StoreLocation {
    Memory,
    File(PathBuf),
}

/// Parse `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a bare path.
fn parse_location(url: &str) -> Result<StoreLocation, StoreError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(StoreError::Connection("empty connection string".to_string()));
    }

    if matches!(url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
        return Ok(StoreLocation::Memory);
    }

    if let Some(path) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) {
        if path.is_empty() {
            return Err(StoreError::Connection(format!("missing database path in {}", url)));
        }
        return Ok(StoreLocation::File(PathBuf::from(path)));
    }

    if let Some((scheme, _)) = url.split_once("://") {
        return Err(StoreError::Connection(format!(
            "unsupported store scheme '{}', expected sqlite",
            scheme
        )));
    }

    Ok(StoreLocation::File(PathBuf::from(url)))
}

/// Map a SQLite failure onto the store error tags.
fn sqlite_error(context: &str, err: rusqlite::Error) -> StoreError {
    let message = format!("{}: {}", context, err);
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => StoreError::Timeout(message),
        Some(ErrorCode::CannotOpen) | Some(ErrorCode::NotADatabase) => StoreError::Connection(message),
        _ => StoreError::Backend(message),
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> Result<Embedding, StoreError> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::Backend(format!(
            "corrupt embedding blob of {} bytes",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// SQLite vector store sharing one connection.
#[derive(Debug)]
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteVectorStore {
    /// Open (or create) the database named by `url` and install the schema.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let conn = match parse_location(url)? {
            StoreLocation::Memory => Connection::open_in_memory()
                .map_err(|e| StoreError::Connection(format!("{}: {}", url, e)))?,
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Connection(format!("cannot create {:?}: {}", parent, e))
                    })?;
                }
                Connection::open(&path)
                    .map_err(|e| StoreError::Connection(format!("{:?}: {}", path, e)))?
            }
        };

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| sqlite_error("failed to set busy timeout", e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| sqlite_error("failed to create tables", e))?;

        tracing::debug!("Opened SQLite vector store at {}", url);

        Ok(Self {
            conn: Mutex::new(conn),
            location: url.to_string(),
        })
    }

    /// Private in-memory store.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::connect(MEMORY_URL)
    }

    /// Connection string this store was opened with.
    pub fn location(&self) -> &str {
        &self.location
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("store connection lock poisoned".to_string()))
    }

    fn index_settings(
        conn: &Connection,
        name: &str,
    ) -> Result<Option<(usize, DistanceMetric)>, StoreError> {
        let row = conn
            .query_row(
                "SELECT dimension, metric FROM vector_indexes WHERE name = ?1",
                params![name],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|e| sqlite_error("failed to read index", e))?;

        match row {
            Some((dimension, metric)) => {
                let metric = metric.parse::<DistanceMetric>().map_err(StoreError::Backend)?;
                Ok(Some((dimension as usize, metric)))
            }
            None => Ok(None),
        }
    }

    fn require_index(conn: &Connection, name: &str) -> Result<(usize, DistanceMetric), StoreError> {
        Self::index_settings(conn, name)?.ok_or_else(|| StoreError::IndexNotFound(name.to_string()))
    }
}

#[async_trait::async_trait]
impl VectorStore for SqliteVectorStore {
    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;

        if let Some((existing_dim, existing_metric)) = Self::index_settings(&conn, name)? {
            if existing_dim == dimension && existing_metric == metric {
                return Err(StoreError::AlreadyExists(name.to_string()));
            }
            return Err(StoreError::Backend(format!(
                "index \"{}\" exists with dimension {} and metric {}, requested dimension {} and metric {}",
                name, existing_dim, existing_metric, dimension, metric
            )));
        }

        conn.execute(
            "INSERT INTO vector_indexes (name, dimension, metric, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, dimension as i64, metric.as_str(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| sqlite_error("failed to create index", e))?;

        tracing::debug!("Created index '{}' ({} dims, {})", name, dimension, metric);
        Ok(())
    }

    async fn upsert(
        &self,
        index_name: &str,
        ids: &[String],
        vectors: &[Embedding],
        metadata: &[Metadata],
    ) -> Result<(), StoreError> {
        if ids.len() != vectors.len() || ids.len() != metadata.len() {
            return Err(StoreError::Backend(format!(
                "upsert batch is ragged: {} ids, {} vectors, {} metadata",
                ids.len(),
                vectors.len(),
                metadata.len()
            )));
        }

        let mut conn = self.lock()?;
        let (dimension, _) = Self::require_index(&conn, index_name)?;

        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let tx = conn
            .transaction()
            .map_err(|e| sqlite_error("failed to begin transaction", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO vectors (index_name, id, embedding, metadata) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (index_name, id) DO UPDATE SET
                        embedding = excluded.embedding,
                        metadata = excluded.metadata",
                )
                .map_err(|e| sqlite_error("failed to prepare upsert", e))?;

            for ((id, vector), meta) in ids.iter().zip(vectors).zip(metadata) {
                let metadata_json = serde_json::to_string(meta)
                    .map_err(|e| StoreError::Backend(format!("failed to serialize metadata: {}", e)))?;
                stmt.execute(params![index_name, id, embedding_to_bytes(vector), metadata_json])
                    .map_err(|e| sqlite_error("failed to upsert vector", e))?;
            }
        }
        tx.commit()
            .map_err(|e| sqlite_error("failed to commit upsert", e))?;

        tracing::debug!("Upserted {} vectors into '{}'", ids.len(), index_name);
        Ok(())
    }

    async fn query(&self, request: &QueryRequest) -> Result<Vec<QueryHit>, StoreError> {
        let conn = self.lock()?;
        let (dimension, metric) = Self::require_index(&conn, &request.index_name)?;

        if request.vector.len() != dimension {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: request.vector.len(),
            });
        }

        let mut stmt = conn
            .prepare("SELECT id, embedding, metadata FROM vectors WHERE index_name = ?1")
            .map_err(|e| sqlite_error("failed to prepare query", e))?;

        let rows = stmt
            .query_map(params![request.index_name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| sqlite_error("failed to query vectors", e))?;

        let mut scored: Vec<(String, f32, String, Embedding)> = Vec::new();
        for row in rows {
            let (id, blob, metadata_json) = row.map_err(|e| sqlite_error("failed to read row", e))?;
            let vector = bytes_to_embedding(&blob)?;
            let score = metric.score(&request.vector, &vector);
            // NaN never passes the threshold
            if score >= request.min_score {
                scored.push((id, score, metadata_json, vector));
            }
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(request.top_k);

        let hits = scored
            .into_iter()
            .map(|(id, score, metadata_json, vector)| {
                let metadata: Metadata = serde_json::from_str(&metadata_json).map_err(|e| {
                    StoreError::Backend(format!("failed to parse metadata of '{}': {}", id, e))
                })?;
                Ok(QueryHit {
                    id,
                    score: Some(score),
                    metadata: Some(metadata),
                    vector: request.include_vector.then_some(vector),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        tracing::debug!(
            "Query on '{}' returned {} hits (top_k={}, min_score={})",
            request.index_name,
            hits.len(),
            request.top_k,
            request.min_score
        );

        Ok(hits)
    }

    async fn describe_index(&self, name: &str) -> Result<IndexStats, StoreError> {
        let conn = self.lock()?;
        let (dimension, metric) = Self::require_index(&conn, name)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM vectors WHERE index_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| sqlite_error("failed to count vectors", e))?;

        Ok(IndexStats {
            name: name.to_string(),
            dimension,
            metric,
            count: count as u64,
        })
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name FROM vector_indexes ORDER BY name")
            .map_err(|e| sqlite_error("failed to list indexes", e))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| sqlite_error("failed to list indexes", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlite_error("failed to read index name", e))?;

        Ok(names)
    }

    async fn delete_index(&self, name: &str) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| sqlite_error("failed to begin transaction", e))?;

        tx.execute("DELETE FROM vectors WHERE index_name = ?1", params![name])
            .map_err(|e| sqlite_error("failed to delete vectors", e))?;
        let removed = tx
            .execute("DELETE FROM vector_indexes WHERE name = ?1", params![name])
            .map_err(|e| sqlite_error("failed to delete index", e))?;

        if removed == 0 {
            return Err(StoreError::IndexNotFound(name.to_string()));
        }

        tx.commit()
            .map_err(|e| sqlite_error("failed to commit delete", e))?;

        tracing::info!("Deleted index '{}'", name);
        Ok(())
    }
}
