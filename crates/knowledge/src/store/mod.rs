//! Contract storage and search.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::types::{Candidate, ChunkMetadata};
use clause_core::AppResult;

/// Read-only query surface used by retrieval.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait::async_trait]
pub trait ContractStore: Send + Sync {
    /// Keyword search, ordered by descending `lexical_score`.
    async fn query_lexical(&self, corpus_key: &str, question: &str, limit: usize) -> AppResult<Vec<Candidate>>;

    /// Nearest-neighbour search, ordered by ascending `vector_distance`.
    async fn query_vector(&self, corpus_key: &str, vector: &[f32], limit: usize) -> AppResult<Vec<Candidate>>;

    /// Check that the store can serve queries.
    async fn health(&self) -> AppResult<()>;
}

/// A chunk as written by the corpus loader.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    pub id: String,
    pub corpus_key: String,
    pub document_id: String,
    pub position: usize,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub embedding: Option<Vec<f32>>,
}
