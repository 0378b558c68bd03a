//! Hybrid retrieval: embed, search both paths concurrently, fuse.

use super::fusion::fuse;
use crate::embeddings::QueryEmbedder;
use crate::store::ContractStore;
use crate::types::{Candidate, QueryRequest};
use clause_core::AppResult;
use std::sync::Arc;

/// Runs lexical and vector searches for a request and fuses the results.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn ContractStore>,
    embedder: QueryEmbedder,
}

impl Retriever {
    pub fn new(store: Arc<dyn ContractStore>, embedder: QueryEmbedder) -> Self {
        Self { store, embedder }
    }

    pub fn embedder(&self) -> &QueryEmbedder {
        &self.embedder
    }

    /// Retrieve fused candidates for `request`.
    ///
    /// Never fails: a failed search path contributes no results, and a
    /// question without an embedding is searched lexically only.
    pub async fn retrieve(&self, request: &QueryRequest) -> Vec<Candidate> {
        let vector = if self.embedder.is_enabled() {
            self.embedder.embed(&request.question).await
        } else {
            None
        };

        let lexical = self
            .store
            .query_lexical(&request.corpus_key, &request.question, request.limit);

        let (lexical, vector) = match vector {
            Some(vector) => {
                let vector_query = self.store.query_vector(&request.corpus_key, &vector, request.limit);
                futures::join!(lexical, vector_query)
            }
            // Skipped, not awaited-and-ignored
            None => (lexical.await, Ok(Vec::new())),
        };

        let lexical = or_empty(lexical, "lexical");
        let vector = or_empty(vector, "vector");

        tracing::debug!(
            lexical = lexical.len(),
            vector = vector.len(),
            "Search paths complete"
        );

        let fused = fuse(lexical, vector);

        match request.document_ids.as_deref() {
            Some(filter) => fused
                .into_iter()
                .filter(|c| {
                    c.metadata
                        .document_id
                        .as_ref()
                        .is_some_and(|id| filter.contains(id))
                })
                .collect(),
            None => fused,
        }
    }
}

fn or_empty(result: AppResult<Vec<Candidate>>, path: &'static str) -> Vec<Candidate> {
    result.unwrap_or_else(|e| {
        tracing::warn!(path, error = %e, "Store query failed, continuing without it");
        Vec::new()
    })
}
