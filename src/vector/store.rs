// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Persistent document collections
//!
//! A [`VectorStore`] owns a root directory holding one SQLite database
//! ([`DATABASE_FILE`]). Every [`Collection`] is a set of rows in that
//! database keyed by `(collection, id)`; embeddings are stored as
//! little-endian `f32` BLOBs and compared in Rust with an exact cosine scan.
//!
//! SQLite calls are blocking, so each operation runs on
//! `tokio::task::spawn_blocking` while holding the connection mutex.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Database file inside the store root
pub const DATABASE_FILE: &str = "vectors.sqlite3";

/// Free-form document metadata (a JSON object)
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Errors raised by the vector store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    #[error("Duplicate id in batch: {0}")]
    DuplicateId(String),

    #[error("Embedding dimension mismatch for {id}: expected {expected}, got {actual}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Embedding for {0} contains NaN or Infinity values")]
    NonFiniteEmbedding(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection lock poisoned: {0}")]
    Lock(String),

    #[error("Blocking task failed: {0}")]
    Task(String),
}

/// A document ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// A stored document as read back from the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// One nearest-neighbour hit from [`Collection::query`]
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    /// Cosine distance, ascending across a result list
    pub distance: f32,
}

type SharedConnection = Arc<Mutex<Connection>>;

/// Runs `f` against the locked connection on the blocking pool
async fn with_connection<T, F>(conn: &SharedConnection, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
{
    let conn = Arc::clone(conn);
    tokio::task::spawn_blocking(move || {
        let mut conn = conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        f(&mut *conn)
    })
    .await
    .map_err(|e| StoreError::Task(e.to_string()))?
}

/// A named, persistent set of documents with embeddings
#[derive(Debug)]
pub struct Collection {
    name: String,
    conn: SharedConnection,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embedding dimension, once the first document has been added
    pub async fn dimension(&self) -> Result<Option<usize>, StoreError> {
        let name = self.name.clone();
        with_connection(&self.conn, move |conn| stored_dimension(conn, &name)).await
    }

    /// Number of stored documents
    pub async fn count(&self) -> Result<usize, StoreError> {
        let name = self.name.clone();
        with_connection(&self.conn, move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                params![name],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
    }

    /// Looks up a stored document by id
    pub async fn get(&self, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let name = self.name.clone();
        let id = id.to_string();
        with_connection(&self.conn, move |conn| {
            let row = conn
                .query_row(
                    "SELECT document, metadata, embedding FROM documents
                     WHERE collection = ?1 AND id = ?2",
                    params![name, id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                        ))
                    },
                )
                .optional()?;

            row.map(|(document, metadata, blob)| -> Result<StoredDocument, StoreError> {
                Ok(StoredDocument {
                    document,
                    embedding: blob_to_embedding(&blob),
                    metadata: serde_json::from_str(&metadata)?,
                })
            })
            .transpose()
        })
        .await
    }

    /// Inserts or replaces documents
    ///
    /// The batch runs in one transaction: on any validation or storage
    /// failure the collection is left unchanged. Returns the batch size.
    pub async fn add(&self, records: Vec<DocumentRecord>) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
            if record.embedding.iter().any(|v| !v.is_finite()) {
                return Err(StoreError::NonFiniteEmbedding(record.id.clone()));
            }
        }

        let rows = records
            .into_iter()
            .map(|record| -> Result<(DocumentRecord, String), StoreError> {
                let metadata = serde_json::to_string(&record.metadata)?;
                Ok((record, metadata))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let name = self.name.clone();
        let added = with_connection(&self.conn, move |conn| {
            let expected = match stored_dimension(conn, &name)? {
                Some(dimension) => dimension,
                None => rows[0].0.embedding.len(),
            };
            for (record, _) in &rows {
                if record.embedding.len() != expected || expected == 0 {
                    return Err(StoreError::DimensionMismatch {
                        id: record.id.clone(),
                        expected,
                        actual: record.embedding.len(),
                    });
                }
            }

            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE collections SET dimension = ?2 WHERE name = ?1 AND dimension IS NULL",
                params![name, expected as i64],
            )?;
            {
                let mut upsert = tx.prepare(
                    "INSERT INTO documents (collection, id, document, metadata, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (collection, id) DO UPDATE SET
                         document = excluded.document,
                         metadata = excluded.metadata,
                         embedding = excluded.embedding",
                )?;
                for (record, metadata) in &rows {
                    upsert.execute(params![
                        name,
                        record.id,
                        record.document,
                        metadata,
                        embedding_to_blob(&record.embedding)
                    ])?;
                }
            }
            tx.commit()?;
            Ok(rows.len())
        })
        .await?;

        debug!("Upserted {} documents into {}", added, self.name);
        Ok(added)
    }

    /// Removes documents by id, ignoring ids that are not stored
    ///
    /// Returns how many documents were actually removed.
    pub async fn delete(&self, ids: &[String]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let name = self.name.clone();
        let ids = ids.to_vec();
        let removed = with_connection(&self.conn, move |conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            {
                let mut delete =
                    tx.prepare("DELETE FROM documents WHERE collection = ?1 AND id = ?2")?;
                for id in &ids {
                    removed += delete.execute(params![name, id])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await?;

        debug!("Removed {} documents from {}", removed, self.name);
        Ok(removed)
    }

    /// Nearest stored documents to `embedding`, closest first
    ///
    /// Every stored vector is scored, so the result always holds
    /// `min(top_k, count)` matches. Equal distances are ordered by id.
    pub async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, StoreError> {
        if top_k == 0 {
            return Ok(vec![]);
        }

        let name = self.name.clone();
        let query = embedding.to_vec();
        with_connection(&self.conn, move |conn| {
            let Some(dimension) = stored_dimension(conn, &name)? else {
                return Ok(vec![]);
            };
            if query.len() != dimension {
                return Err(StoreError::DimensionMismatch {
                    id: "<query>".to_string(),
                    expected: dimension,
                    actual: query.len(),
                });
            }

            let mut scored: Vec<(String, f32)> = Vec::new();
            {
                let mut stmt =
                    conn.prepare("SELECT id, embedding FROM documents WHERE collection = ?1")?;
                let rows = stmt.query_map(params![name], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
                })?;
                for row in rows {
                    let (id, blob) = row?;
                    let distance = cosine_distance(&query, &blob_to_embedding(&blob));
                    scored.push((id, distance));
                }
            }

            scored.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            scored.truncate(top_k);

            let mut lookup = conn.prepare(
                "SELECT document, metadata FROM documents WHERE collection = ?1 AND id = ?2",
            )?;
            let mut matches = Vec::with_capacity(scored.len());
            for (id, distance) in scored {
                let (document, metadata) = lookup.query_row(params![name, id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                matches.push(QueryMatch {
                    id,
                    document,
                    metadata: serde_json::from_str(&metadata)?,
                    distance,
                });
            }
            Ok(matches)
        })
        .await
    }
}

/// SQLite-backed set of named collections
#[derive(Debug)]
pub struct VectorStore {
    conn: SharedConnection,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl VectorStore {
    /// Opens (creating if needed) the store root and its database
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        let path = root.join(DATABASE_FILE);
        info!("Vector store at {}", path.display());

        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let conn = Connection::open(&path)?;
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS collections (
                    name      TEXT PRIMARY KEY,
                    dimension INTEGER
                );
                CREATE TABLE IF NOT EXISTS documents (
                    collection TEXT NOT NULL REFERENCES collections (name),
                    id         TEXT NOT NULL,
                    document   TEXT NOT NULL,
                    metadata   TEXT NOT NULL DEFAULT '{}',
                    embedding  BLOB NOT NULL,
                    PRIMARY KEY (collection, id)
                );",
            )?;
            Ok(conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collections: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the named collection, creating it on first use
    pub async fn get_or_create_collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        if let Some(collection) = self.collections.read().await.get(name) {
            return Ok(Arc::clone(collection));
        }

        validate_collection_name(name)?;

        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let owned = name.to_string();
        let created = with_connection(&self.conn, move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO collections (name, dimension) VALUES (?1, NULL)",
                params![owned],
            )?;
            Ok(inserted > 0)
        })
        .await?;
        if created {
            debug!("Created collection {}", name);
        }

        let collection = Arc::new(Collection {
            name: name.to_string(),
            conn: Arc::clone(&self.conn),
        });
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}

fn stored_dimension(conn: &Connection, name: &str) -> Result<Option<usize>, StoreError> {
    let dimension: Option<Option<i64>> = conn
        .query_row(
            "SELECT dimension FROM collections WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(dimension.flatten().map(|d| d as usize))
}

fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollectionName(name.to_string()))
    }
}

/// Serialize an embedding to a little-endian byte blob
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize a little-endian byte blob to an embedding
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine distance (`1 - cosine similarity`)
///
/// A zero vector counts as orthogonal to everything.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 1.0;
    }

    1.0 - dot / (mag_a * mag_b)
}
