//! SQLite-backed contract store.
//!
//! Keyword relevance comes from an FTS5 table kept alongside `chunks`;
//! vector distance is computed by brute force over stored embeddings.

use super::{ChunkRecord, ContractStore};
use crate::types::{Candidate, ChunkMetadata, ContractDocument, StoreStats};
use chrono::{DateTime, Utc};
use clause_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Terms that never narrow a contract search.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "get",
    "has", "have", "how", "i", "if", "in", "is", "it", "me", "my", "of", "on", "or", "our",
    "should", "that", "the", "their", "there", "this", "to", "was", "we", "what", "when",
    "where", "which", "who", "why", "will", "with", "you", "your",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    corpus_key TEXT NOT NULL,
    title TEXT NOT NULL,
    url TEXT,
    sha256 TEXT,
    last_ingested_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    corpus_key TEXT NOT NULL,
    document_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    embedding BLOB,
    FOREIGN KEY (document_id) REFERENCES documents(id)
);

CREATE INDEX IF NOT EXISTS idx_chunks_corpus ON chunks(corpus_key);
CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);

CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    chunk_id UNINDEXED,
    corpus_key UNINDEXED,
    text
);
"#;

/// Contract store on a single SQLite connection.
///
/// Queries run on the blocking thread pool; the connection is serialized
/// behind a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Store(format!("Failed to create store directory: {}", e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite store: {}", e)))?;

        tracing::debug!("Opened contract store at {:?}", path);
        Self::from_connection(conn)
    }

    /// Store backed by a private in-memory database.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open SQLite store: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| AppError::Store("SQLite connection lock poisoned".to_string()))?;
            op(&mut *guard)
        })
        .await
        .map_err(|e| AppError::Store(format!("Store task failed: {}", e)))?
    }

    /// Insert or replace a document row.
    pub async fn upsert_document(&self, document: &ContractDocument) -> AppResult<()> {
        let document = document.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO documents (id, corpus_key, title, url, sha256, last_ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    document.id,
                    document.corpus_key,
                    document.title,
                    document.url,
                    document.sha256,
                    document.last_ingested_at.to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert document: {}", e)))?;
            Ok(())
        })
        .await
    }

    /// Insert or replace a chunk and its keyword index entry.
    pub async fn upsert_chunk(&self, chunk: &ChunkRecord) -> AppResult<()> {
        let chunk = chunk.clone();
        let metadata_json = serde_json::to_string(&chunk.metadata)?;
        let embedding = chunk.embedding.as_deref().map(embedding_to_bytes);

        self.run(move |conn| {
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

            tx.execute(
                "INSERT OR REPLACE INTO chunks (id, corpus_key, document_id, position, text, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    chunk.id,
                    chunk.corpus_key,
                    chunk.document_id,
                    chunk.position as i64,
                    chunk.text,
                    metadata_json,
                    embedding,
                ],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert chunk: {}", e)))?;

            tx.execute("DELETE FROM chunks_fts WHERE chunk_id = ?1", params![chunk.id])
                .map_err(|e| AppError::Store(format!("Failed to update keyword index: {}", e)))?;
            tx.execute(
                "INSERT INTO chunks_fts (chunk_id, corpus_key, text) VALUES (?1, ?2, ?3)",
                params![chunk.id, chunk.corpus_key, chunk.text],
            )
            .map_err(|e| AppError::Store(format!("Failed to update keyword index: {}", e)))?;

            tx.commit()
                .map_err(|e| AppError::Store(format!("Failed to commit chunk: {}", e)))
        })
        .await
    }

    /// Delete every document and chunk of a corpus. Returns the number of
    /// chunks removed.
    pub async fn reset_corpus(&self, corpus_key: &str) -> AppResult<u64> {
        let corpus_key = corpus_key.to_string();
        self.run(move |conn| {
            let tx = conn
                .transaction()
                .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

            tx.execute("DELETE FROM chunks_fts WHERE corpus_key = ?1", params![corpus_key])
                .map_err(|e| AppError::Store(format!("Failed to delete keyword index: {}", e)))?;
            let removed = tx
                .execute("DELETE FROM chunks WHERE corpus_key = ?1", params![corpus_key])
                .map_err(|e| AppError::Store(format!("Failed to delete chunks: {}", e)))?;
            tx.execute("DELETE FROM documents WHERE corpus_key = ?1", params![corpus_key])
                .map_err(|e| AppError::Store(format!("Failed to delete documents: {}", e)))?;

            tx.commit()
                .map_err(|e| AppError::Store(format!("Failed to commit reset: {}", e)))?;

            tracing::info!(corpus = %corpus_key, chunks = removed, "Reset contract corpus");
            Ok(removed as u64)
        })
        .await
    }

    /// Documents of one corpus (or all corpora), by title.
    pub async fn list_documents(&self, corpus_key: Option<&str>) -> AppResult<Vec<ContractDocument>> {
        let corpus_key = corpus_key.map(str::to_string);
        self.run(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, corpus_key, title, url, sha256, last_ingested_at FROM documents
                     WHERE ?1 IS NULL OR corpus_key = ?1
                     ORDER BY title, id",
                )
                .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

            let rows = stmt
                .query_map(params![corpus_key], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                })
                .map_err(|e| AppError::Store(format!("Failed to query documents: {}", e)))?;

            let mut documents = Vec::new();
            for row in rows {
                let (id, corpus_key, title, url, sha256, ingested) =
                    row.map_err(|e| AppError::Store(format!("Failed to read document: {}", e)))?;
                documents.push(ContractDocument {
                    id,
                    corpus_key,
                    title,
                    url,
                    sha256,
                    last_ingested_at: parse_timestamp(&ingested)?,
                });
            }

            Ok(documents)
        })
        .await
    }

    /// Look up one document by id.
    pub async fn get_document(&self, id: &str) -> AppResult<Option<ContractDocument>> {
        let id = id.to_string();
        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT corpus_key, title, url, sha256, last_ingested_at FROM documents WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Option<String>>(2)?,
                            row.get::<_, Option<String>>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                )
                .optional()
                .map_err(|e| AppError::Store(format!("Failed to query document: {}", e)))?;

            row.map(|(corpus_key, title, url, sha256, ingested)| {
                Ok(ContractDocument {
                    id: id.clone(),
                    corpus_key,
                    title,
                    url,
                    sha256,
                    last_ingested_at: parse_timestamp(&ingested)?,
                })
            })
            .transpose()
        })
        .await
    }

    /// Row counts for one corpus (or all corpora).
    pub async fn stats(&self, corpus_key: Option<&str>) -> AppResult<StoreStats> {
        let corpus_key = corpus_key.map(str::to_string);
        self.run(move |conn| {
            let count = |sql: &str| -> AppResult<u64> {
                conn.query_row(sql, params![corpus_key], |row| row.get::<_, i64>(0))
                    .map(|v| v as u64)
                    .map_err(|e| AppError::Store(format!("Failed to count rows: {}", e)))
            };

            Ok(StoreStats {
                documents: count("SELECT COUNT(*) FROM documents WHERE ?1 IS NULL OR corpus_key = ?1")?,
                chunks: count("SELECT COUNT(*) FROM chunks WHERE ?1 IS NULL OR corpus_key = ?1")?,
                embedded_chunks: count(
                    "SELECT COUNT(*) FROM chunks WHERE (?1 IS NULL OR corpus_key = ?1) AND embedding IS NOT NULL",
                )?,
            })
        })
        .await
    }
}

#[async_trait::async_trait]
impl ContractStore for SqliteStore {
    async fn query_lexical(&self, corpus_key: &str, question: &str, limit: usize) -> AppResult<Vec<Candidate>> {
        let Some(match_query) = build_match_query(question) else {
            tracing::debug!("Question has no searchable terms");
            return Ok(Vec::new());
        };

        let corpus_key = corpus_key.to_string();
        self.run(move |conn| {
            let mut stmt = conn
                .prepare(
                    "WITH hits AS (
                         SELECT chunk_id, -bm25(chunks_fts) AS score
                         FROM chunks_fts
                         WHERE chunks_fts MATCH ?1 AND corpus_key = ?2
                         ORDER BY score DESC, chunk_id
                         LIMIT ?3
                     )
                     SELECT c.id, c.corpus_key, c.text, c.metadata, c.document_id, d.title, hits.score
                     FROM hits
                     JOIN chunks c ON c.id = hits.chunk_id
                     LEFT JOIN documents d ON d.id = c.document_id
                     ORDER BY hits.score DESC, c.id",
                )
                .map_err(|e| AppError::Store(format!("Failed to prepare keyword query: {}", e)))?;

            let rows = stmt
                .query_map(params![match_query, corpus_key, limit as i64], |row| {
                    Ok((read_candidate(row)?, row.get::<_, f64>(6)?))
                })
                .map_err(|e| AppError::Store(format!("Failed to run keyword query: {}", e)))?;

            let mut candidates = Vec::new();
            for row in rows {
                let (candidate, score) =
                    row.map_err(|e| AppError::Store(format!("Failed to read chunk: {}", e)))?;
                candidates.push(candidate.with_lexical_score(score));
            }

            tracing::debug!(corpus = %corpus_key, results = candidates.len(), "Keyword query complete");
            Ok(candidates)
        })
        .await
    }

    async fn query_vector(&self, corpus_key: &str, vector: &[f32], limit: usize) -> AppResult<Vec<Candidate>> {
        let corpus_key = corpus_key.to_string();
        let query = vector.to_vec();

        self.run(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT c.id, c.corpus_key, c.text, c.metadata, c.document_id, d.title, c.embedding
                     FROM chunks c
                     LEFT JOIN documents d ON d.id = c.document_id
                     WHERE c.corpus_key = ?1 AND c.embedding IS NOT NULL
                     ORDER BY c.id",
                )
                .map_err(|e| AppError::Store(format!("Failed to prepare vector query: {}", e)))?;

            let rows = stmt
                .query_map(params![corpus_key], |row| {
                    Ok((read_candidate(row)?, row.get::<_, Vec<u8>>(6)?))
                })
                .map_err(|e| AppError::Store(format!("Failed to run vector query: {}", e)))?;

            let mut scored = Vec::new();
            for row in rows {
                let (candidate, bytes) =
                    row.map_err(|e| AppError::Store(format!("Failed to read chunk: {}", e)))?;

                let Some(embedding) = bytes_to_embedding(&bytes) else {
                    tracing::warn!(chunk = %candidate.id, "Skipping chunk with corrupt embedding");
                    continue;
                };
                if embedding.len() != query.len() {
                    continue;
                }

                let distance = 1.0 - cosine_similarity(&query, &embedding) as f64;
                scored.push(candidate.with_vector_distance(distance));
            }

            // Stable: equal distances stay in id order
            scored.sort_by(|a, b| {
                let a = a.vector_distance.unwrap_or(f64::INFINITY);
                let b = b.vector_distance.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
            scored.truncate(limit);

            tracing::debug!(corpus = %corpus_key, results = scored.len(), "Vector query complete");
            Ok(scored)
        })
        .await
    }

    async fn health(&self) -> AppResult<()> {
        self.run(|conn| {
            conn.query_row("SELECT COUNT(*) FROM chunks_fts", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|e| AppError::Store(format!("Store health check failed: {}", e)))
        })
        .await
    }
}

/// Map the shared leading columns (id, corpus, text, metadata, document id,
/// document title) to a candidate.
fn read_candidate(row: &rusqlite::Row<'_>) -> rusqlite::Result<Candidate> {
    let metadata_json: String = row.get(3)?;
    let document_id: String = row.get(4)?;
    let document_title: Option<String> = row.get(5)?;

    let mut metadata = ChunkMetadata::parse_lenient(&metadata_json);
    if metadata.document_id.is_none() {
        metadata.document_id = Some(document_id);
    }
    if metadata.document_title.is_none() {
        metadata.document_title = document_title;
    }

    Ok(Candidate::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)
        .with_metadata(metadata))
}

/// Reduce a question to an FTS5 OR-query of quoted terms.
///
/// Returns `None` when nothing searchable is left.
pub fn build_match_query(question: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let terms: Vec<String> = question
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|term| term.chars().count() > 1 && !STOP_WORDS.contains(&term.as_str()))
        .filter(|term| seen.insert(term.clone()))
        .map(|term| format!("\"{}\"", term))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::Store(format!("Invalid timestamp '{}': {}", value, e)))
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Cosine similarity; zero for mismatched or zero-length vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document(id: &str, corpus: &str) -> ContractDocument {
        ContractDocument {
            id: id.to_string(),
            corpus_key: corpus.to_string(),
            title: format!("{} Agreement", id),
            url: Some(format!("https://example.org/{}.pdf", id)),
            sha256: None,
            last_ingested_at: Utc::now(),
        }
    }

    fn chunk(id: &str, corpus: &str, document_id: &str, text: &str, embedding: Option<Vec<f32>>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            corpus_key: corpus.to_string(),
            document_id: document_id.to_string(),
            position: 0,
            text: text.to_string(),
            metadata: ChunkMetadata {
                article: Some("Article 12".to_string()),
                ..Default::default()
            },
            embedding,
        }
    }

    async fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_document(&document("nx-2022", "NX")).await.unwrap();
        store.upsert_document(&document("bx-2022", "BX")).await.unwrap();
        store
            .upsert_chunk(&chunk("c1", "NX", "nx-2022", "Overtime is paid at time and one-half.", Some(vec![1.0, 0.0])))
            .await
            .unwrap();
        store
            .upsert_chunk(&chunk("c2", "NX", "nx-2022", "Vacation accrues monthly.", Some(vec![0.0, 1.0])))
            .await
            .unwrap();
        store
            .upsert_chunk(&chunk("c3", "NX", "nx-2022", "Overtime overtime overtime rules.", None))
            .await
            .unwrap();
        store
            .upsert_chunk(&chunk("b1", "BX", "bx-2022", "Overtime for clerical staff.", Some(vec![1.0, 0.0])))
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_build_match_query() {
        assert_eq!(
            build_match_query("How is OVERTIME paid? overtime!").as_deref(),
            Some("\"overtime\" OR \"paid\"")
        );
        assert_eq!(build_match_query("how is the"), None);
        assert_eq!(build_match_query("\"quoted\" AND -stuff*").as_deref(), Some("\"quoted\" OR \"stuff\""));
    }

    #[tokio::test]
    async fn test_lexical_query_scoped_to_corpus() {
        let store = seeded().await;
        let results = store.query_lexical("NX", "How is overtime paid?", 10).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&"c1"));
        assert!(ids.contains(&"c3"));
        assert!(!ids.contains(&"b1"));
        assert!(results.iter().all(|c| c.lexical_score.is_some() && c.vector_distance.is_none()));
        assert!(results.windows(2).all(|w| w[0].lexical_score >= w[1].lexical_score));
    }

    #[tokio::test]
    async fn test_lexical_query_fills_document_metadata() {
        let store = seeded().await;
        let results = store.query_lexical("NX", "vacation accrual", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        let metadata = &results[0].metadata;
        assert_eq!(metadata.document_id.as_deref(), Some("nx-2022"));
        assert_eq!(metadata.document_title.as_deref(), Some("nx-2022 Agreement"));
        assert_eq!(metadata.article.as_deref(), Some("Article 12"));
    }

    #[tokio::test]
    async fn test_lexical_query_without_terms() {
        let store = seeded().await;
        assert!(store.query_lexical("NX", "how is the", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vector_query_orders_by_distance() {
        let store = seeded().await;
        let results = store.query_vector("NX", &[0.9, 0.1], 10).await.unwrap();

        // c3 has no embedding and is skipped
        let ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert!(results[0].vector_distance.unwrap() < results[1].vector_distance.unwrap());
        assert!(results.iter().all(|c| c.lexical_score.is_none()));

        let limited = store.query_vector("NX", &[0.9, 0.1], 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_vector_query_skips_mismatched_dimensions() {
        let store = seeded().await;
        assert!(store.query_vector("NX", &[1.0, 0.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_keyword_entry() {
        let store = seeded().await;
        store
            .upsert_chunk(&chunk("c2", "NX", "nx-2022", "Holiday premium pay.", None))
            .await
            .unwrap();

        assert!(store.query_lexical("NX", "vacation", 5).await.unwrap().is_empty());
        assert_eq!(store.query_lexical("NX", "holiday", 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_metadata_is_tolerated() {
        let store = seeded().await;
        {
            let conn = store.conn.lock().unwrap();
            conn.execute("UPDATE chunks SET metadata = 'not json' WHERE id = 'c2'", [])
                .unwrap();
        }

        let results = store.query_lexical("NX", "vacation", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.article, None);
        assert_eq!(results[0].metadata.document_id.as_deref(), Some("nx-2022"));
    }

    #[tokio::test]
    async fn test_stats_and_reset() {
        let store = seeded().await;

        let stats = store.stats(Some("NX")).await.unwrap();
        assert_eq!(stats, StoreStats { documents: 1, chunks: 3, embedded_chunks: 2 });
        assert_eq!(store.stats(None).await.unwrap().chunks, 4);

        assert_eq!(store.reset_corpus("NX").await.unwrap(), 3);
        assert_eq!(store.stats(Some("NX")).await.unwrap(), StoreStats::default());
        assert!(store.query_lexical("NX", "overtime", 5).await.unwrap().is_empty());
        assert_eq!(store.stats(Some("BX")).await.unwrap().chunks, 1);
    }

    #[tokio::test]
    async fn test_documents_round_trip_on_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("contracts.sqlite");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.upsert_document(&document("nx-2022", "NX")).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        store.health().await.unwrap();
        let documents = store.list_documents(Some("NX")).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].title, "nx-2022 Agreement");
        assert!(store.list_documents(Some("BX")).await.unwrap().is_empty());
        assert!(store.get_document("nx-2022").await.unwrap().is_some());
        assert!(store.get_document("missing").await.unwrap().is_none());
    }

    #[test]
    fn test_embedding_bytes() {
        let bytes = embedding_to_bytes(&[1.5, -2.0]);
        assert_eq!(bytes_to_embedding(&bytes), Some(vec![1.5, -2.0]));
        assert_eq!(bytes_to_embedding(&[0, 1, 2]), None);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
