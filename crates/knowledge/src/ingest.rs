//! Corpus loading from pre-chunked JSON Lines.
//!
//! Each line is one chunk:
//! `{"id"?, "documentId", "documentTitle"?, "documentUrl"?, "text", "metadata"?}`.
//! Crawling and PDF extraction happen upstream; this module only stores
//! what it is given.

use crate::embeddings::QueryEmbedder;
use crate::sources::get_contract_source;
use crate::store::{ChunkRecord, SqliteStore};
use crate::types::{ChunkMetadata, ContractDocument};
use chrono::Utc;
use clause_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// One input line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub document_id: String,
    #[serde(default)]
    pub document_title: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    pub text: String,
    /// Parsed leniently; a mistyped key never rejects the line
    #[serde(default, deserialize_with = "ChunkMetadata::deserialize_lenient")]
    pub metadata: ChunkMetadata,
}

/// Options for one load.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub corpus_key: String,
    pub path: PathBuf,
    /// Delete the corpus before loading
    pub reset: bool,
    /// Texts per embedding request
    pub batch_size: usize,
}

/// Summary of a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub files: u32,
    pub documents: u32,
    pub chunks: u32,
    pub embedded_chunks: u32,
    /// Lines that could not be parsed or had no text
    pub skipped_lines: u32,
    pub duration_secs: f64,
}

/// A parsed file awaiting storage.
struct ParsedFile {
    sha256: String,
    records: Vec<CorpusRecord>,
    skipped: u32,
}

/// Load every `*.jsonl` file under `options.path` into `store`.
pub async fn load_corpus(
    store: &SqliteStore,
    embedder: &QueryEmbedder,
    options: &IngestOptions,
) -> AppResult<IngestStats> {
    let start = Instant::now();
    let corpus_key = options.corpus_key.trim().to_uppercase();

    if corpus_key.is_empty() {
        return Err(AppError::InvalidRequest("Corpus key must not be empty".to_string()));
    }

    if get_contract_source(&corpus_key).is_none() {
        tracing::warn!(corpus = %corpus_key, "Loading a corpus that is not in the source registry");
    }

    let files = collect_files(&options.path)?;
    if files.is_empty() {
        return Err(AppError::Knowledge(format!(
            "No .jsonl files found at {:?}",
            options.path
        )));
    }

    tracing::info!(corpus = %corpus_key, files = files.len(), "Starting corpus load");

    if options.reset {
        store.reset_corpus(&corpus_key).await?;
    }

    let mut stats = IngestStats::default();
    let batch_size = options.batch_size.max(1);

    for file in &files {
        let parsed = parse_file(file)?;
        stats.files += 1;
        stats.skipped_lines += parsed.skipped;

        let mut documents: BTreeMap<String, ContractDocument> = BTreeMap::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut chunks = Vec::with_capacity(parsed.records.len());

        for record in parsed.records {
            let document = documents
                .entry(record.document_id.clone())
                .or_insert_with(|| ContractDocument {
                    id: record.document_id.clone(),
                    corpus_key: corpus_key.clone(),
                    title: record
                        .document_title
                        .clone()
                        .unwrap_or_else(|| record.document_id.clone()),
                    url: record.document_url.clone(),
                    sha256: Some(parsed.sha256.clone()),
                    last_ingested_at: Utc::now(),
                });

            let position = positions.entry(record.document_id.clone()).or_insert(0);
            chunks.push(to_chunk(record, document, &corpus_key, *position));
            *position += 1;
        }

        for document in documents.values() {
            store.upsert_document(document).await?;
        }
        stats.documents += documents.len() as u32;

        for batch in chunks.chunks_mut(batch_size) {
            stats.embedded_chunks += embed_batch(embedder, batch).await;
            for chunk in batch.iter() {
                store.upsert_chunk(chunk).await?;
            }
            stats.chunks += batch.len() as u32;
        }

        tracing::debug!(file = ?file, chunks = chunks.len(), "Loaded file");
    }

    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        corpus = %corpus_key,
        documents = stats.documents,
        chunks = stats.chunks,
        embedded = stats.embedded_chunks,
        skipped = stats.skipped_lines,
        "Corpus load completed in {:.2}s",
        stats.duration_secs
    );

    Ok(stats)
}

/// A single file, or every `*.jsonl` file below a directory in path order.
fn collect_files(path: &Path) -> AppResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        return Err(AppError::Knowledge(format!("Path does not exist: {:?}", path)));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("jsonl"))
        .collect();
    files.sort();

    Ok(files)
}

fn parse_file(path: &Path) -> AppResult<ParsedFile> {
    let bytes = std::fs::read(path)?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    let content = String::from_utf8(bytes)
        .map_err(|e| AppError::Knowledge(format!("{:?} is not valid UTF-8: {}", path, e)))?;

    let mut records = Vec::new();
    let mut skipped = 0;

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CorpusRecord>(line) {
            Ok(record) if !record.text.trim().is_empty() && !record.document_id.trim().is_empty() => {
                records.push(record)
            }
            Ok(_) => {
                tracing::warn!(file = ?path, line = line_no + 1, "Skipping record without text or document id");
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!(file = ?path, line = line_no + 1, error = %e, "Skipping unparseable record");
                skipped += 1;
            }
        }
    }

    Ok(ParsedFile {
        sha256,
        records,
        skipped,
    })
}

fn to_chunk(record: CorpusRecord, document: &ContractDocument, corpus_key: &str, position: usize) -> ChunkRecord {
    let id = record
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| derive_chunk_id(&record.document_id, position, &record.text));

    let mut metadata = record.metadata;
    metadata.document_id = Some(document.id.clone());
    if metadata.document_title.is_none() {
        metadata.document_title = Some(document.title.clone());
    }
    if metadata.url.is_none() {
        metadata.url = document.url.clone();
    }
    if !metadata.extra.contains_key("documentType") {
        let reference = document.url.as_deref().unwrap_or(&document.title);
        if let Some(kind) = get_contract_source(corpus_key).and_then(|s| s.classify(reference)) {
            metadata
                .extra
                .insert("documentType".to_string(), serde_json::Value::from(kind.as_str()));
        }
    }

    ChunkRecord {
        id,
        corpus_key: corpus_key.to_string(),
        document_id: document.id.clone(),
        position,
        text: record.text,
        metadata,
        embedding: None,
    }
}

/// Stable chunk id from its document, position and content.
pub fn derive_chunk_id(document_id: &str, position: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(b":");
    hasher.update(position.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..32].to_string()
}

/// Attach embeddings to a batch. Returns how many chunks were embedded.
async fn embed_batch(embedder: &QueryEmbedder, batch: &mut [ChunkRecord]) -> u32 {
    if !embedder.is_enabled() {
        return 0;
    }

    let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
    match embedder.embed_batch(&texts).await {
        Ok(vectors) if vectors.len() == batch.len() => {
            let mut embedded = 0;
            for (chunk, vector) in batch.iter_mut().zip(vectors) {
                if vector.iter().any(|v| *v != 0.0) {
                    chunk.embedding = Some(vector);
                    embedded += 1;
                }
            }
            embedded
        }
        Ok(vectors) => {
            tracing::warn!(
                expected = batch.len(),
                got = vectors.len(),
                "Embedding batch size mismatch, storing chunks lexical-only"
            );
            0
        }
        Err(e) => {
            tracing::warn!(error = %e, "Embedding batch failed, storing chunks lexical-only");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::store::ContractStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    const NX_LINES: &str = r#"{"documentId": "nx-2022", "documentTitle": "NX Agreement", "documentUrl": "https://ucnet.example/registered-nurses-contract.pdf", "text": "Overtime is paid at time and one-half.", "metadata": {"article": "Article 12", "pages": [41]}}
{"id": "nx-vac-1", "documentId": "nx-2022", "text": "Vacation accrues monthly."}

not json
{"documentId": "nx-2022", "text": "   "}
{"documentId": "nx-sl-4", "documentTitle": "Side Letter 4", "text": "Float pool nurses receive a differential."}
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn options(path: &Path) -> IngestOptions {
        IngestOptions {
            corpus_key: "nx".to_string(),
            path: path.to_path_buf(),
            reset: false,
            batch_size: 2,
        }
    }

    #[tokio::test]
    async fn test_load_file() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "nx.jsonl", NX_LINES);
        let store = SqliteStore::open_in_memory().unwrap();

        let stats = load_corpus(&store, &QueryEmbedder::disabled(), &options(&path))
            .await
            .unwrap();

        assert_eq!(stats.files, 1);
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.embedded_chunks, 0);
        assert_eq!(stats.skipped_lines, 2);

        let documents = store.list_documents(Some("NX")).await.unwrap();
        assert_eq!(documents.len(), 2);
        assert!(documents.iter().all(|d| d.sha256.as_deref().map(str::len) == Some(64)));

        let hits = store.query_lexical("NX", "overtime", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        let metadata = &hits[0].metadata;
        assert_eq!(metadata.article.as_deref(), Some("Article 12"));
        assert_eq!(metadata.document_title.as_deref(), Some("NX Agreement"));
        assert_eq!(metadata.url.as_deref(), Some("https://ucnet.example/registered-nurses-contract.pdf"));
        assert_eq!(metadata.extra.get("documentType"), Some(&serde_json::json!("contract")));

        let vacation = store.query_lexical("NX", "vacation", 5).await.unwrap();
        assert_eq!(vacation[0].id, "nx-vac-1");
    }

    #[tokio::test]
    async fn test_mistyped_metadata_keeps_passage() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "nx.jsonl",
            r#"{"documentId": "nx", "text": "Overtime is paid at time and one-half.", "metadata": {"article": "Article 12", "section": 4, "pages": [31]}}"#,
        );
        let store = SqliteStore::open_in_memory().unwrap();

        let stats = load_corpus(&store, &QueryEmbedder::disabled(), &options(&path))
            .await
            .unwrap();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.chunks, 1);
        assert_eq!(stats.skipped_lines, 0);

        let hits = store.query_lexical("NX", "overtime paid", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        let metadata = &hits[0].metadata;
        assert_eq!(metadata.article.as_deref(), Some("Article 12"));
        assert_eq!(metadata.pages, vec![31]);
        assert_eq!(metadata.section, None);
        assert_eq!(metadata.extra["section"], serde_json::json!(4));
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "nx.jsonl", NX_LINES);
        let store = SqliteStore::open_in_memory().unwrap();
        let embedder = QueryEmbedder::disabled();

        load_corpus(&store, &embedder, &options(&path)).await.unwrap();
        load_corpus(&store, &embedder, &options(&path)).await.unwrap();

        assert_eq!(store.stats(Some("NX")).await.unwrap().chunks, 3);
    }

    #[tokio::test]
    async fn test_directory_load_with_embeddings() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/nx.jsonl", NX_LINES);
        write(temp.path(), "b/notes.txt", "ignored");
        let store = SqliteStore::open_in_memory().unwrap();
        let embedder = QueryEmbedder::new(Some(Arc::new(MockProvider::new(32))));

        let stats = load_corpus(&store, &embedder, &options(temp.path())).await.unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.embedded_chunks, 3);

        let query = embedder.embed("overtime paid").await.unwrap();
        let hits = store.query_vector("NX", &query, 3).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_reset_removes_previous_chunks() {
        let temp = TempDir::new().unwrap();
        let first = write(temp.path(), "first.jsonl", NX_LINES);
        let second = write(
            temp.path(),
            "second.jsonl",
            r#"{"documentId": "nx-2024", "text": "Meal periods are thirty minutes."}"#,
        );
        let store = SqliteStore::open_in_memory().unwrap();
        let embedder = QueryEmbedder::disabled();

        load_corpus(&store, &embedder, &options(&first)).await.unwrap();
        let mut reset = options(&second);
        reset.reset = true;
        load_corpus(&store, &embedder, &reset).await.unwrap();

        let stats = store.stats(Some("NX")).await.unwrap();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.chunks, 1);
    }

    #[tokio::test]
    async fn test_missing_path() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let result = load_corpus(&store, &QueryEmbedder::disabled(), &options(&temp.path().join("missing"))).await;
        assert!(result.is_err());

        let empty = load_corpus(&store, &QueryEmbedder::disabled(), &options(temp.path())).await;
        assert!(empty.is_err());
    }

    #[test]
    fn test_derive_chunk_id_is_stable() {
        let a = derive_chunk_id("nx-2022", 0, "Overtime");
        assert_eq!(a, derive_chunk_id("nx-2022", 0, "Overtime"));
        assert_ne!(a, derive_chunk_id("nx-2022", 1, "Overtime"));
        assert_eq!(a.len(), 32);
    }
}
