//! In-memory collaborators for scenario tests.

use crate::embeddings::EmbeddingProvider;
use crate::store::ContractStore;
use crate::types::{Candidate, ChunkMetadata};
use clause_core::{AppError, AppResult};
use clause_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Store that returns canned results per path.
pub struct FakeStore {
    lexical: Option<Vec<Candidate>>,
    vector: Option<Vec<Candidate>>,
    pub lexical_calls: AtomicUsize,
    pub vector_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new(lexical: Vec<Candidate>, vector: Vec<Candidate>) -> Self {
        Self {
            lexical: Some(lexical),
            vector: Some(vector),
            lexical_calls: AtomicUsize::new(0),
            vector_calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Make the lexical path fail.
    pub fn failing_lexical(mut self) -> Self {
        self.lexical = None;
        self
    }

    /// Make the vector path fail.
    pub fn failing_vector(mut self) -> Self {
        self.vector = None;
        self
    }
}

#[async_trait::async_trait]
impl ContractStore for FakeStore {
    async fn query_lexical(&self, _corpus_key: &str, _question: &str, limit: usize) -> AppResult<Vec<Candidate>> {
        self.lexical_calls.fetch_add(1, Ordering::SeqCst);
        self.lexical
            .as_ref()
            .map(|hits| hits.iter().take(limit).cloned().collect())
            .ok_or_else(|| AppError::Store("keyword index unavailable".to_string()))
    }

    async fn query_vector(&self, _corpus_key: &str, _vector: &[f32], limit: usize) -> AppResult<Vec<Candidate>> {
        self.vector_calls.fetch_add(1, Ordering::SeqCst);
        self.vector
            .as_ref()
            .map(|hits| hits.iter().take(limit).cloned().collect())
            .ok_or_else(|| AppError::Store("vector query failed".to_string()))
    }

    async fn health(&self) -> AppResult<()> {
        Ok(())
    }
}

/// What the fake model does when called.
pub enum FakeReply {
    Content(String),
    Error,
    Hang,
}

/// Model that replays a fixed reply and records the last request.
pub struct FakeLlm {
    reply: FakeReply,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<LlmRequest>>,
}

impl FakeLlm {
    pub fn replying(content: impl Into<String>) -> Self {
        Self::new(FakeReply::Content(content.into()))
    }

    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            FakeReply::Content(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 10),
                done: true,
            }),
            FakeReply::Error => Err(AppError::Llm("connection refused".to_string())),
            FakeReply::Hang => std::future::pending().await,
        }
    }
}

/// Embedder returning the same vector for every text.
#[derive(Debug)]
pub struct FixedEmbedder(pub Vec<f32>);

#[async_trait::async_trait]
impl EmbeddingProvider for FixedEmbedder {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    fn model_name(&self) -> &str {
        "fixed"
    }

    fn dimensions(&self) -> usize {
        self.0.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| self.0.clone()).collect())
    }
}

pub fn passage(id: &str, text: &str) -> Candidate {
    Candidate::new(id, "NX", text).with_metadata(ChunkMetadata {
        article: Some(format!("Article {}", id)),
        document_id: Some("nx-2022".to_string()),
        document_title: Some("NX Agreement".to_string()),
        source: Some("nx-2022.pdf".to_string()),
        pages: vec![10],
        ..Default::default()
    })
}

pub fn lexical_hit(id: &str, score: f64) -> Candidate {
    passage(id, &format!("Contract language for {}.", id)).with_lexical_score(score)
}

pub fn vector_hit(id: &str, distance: f64) -> Candidate {
    passage(id, &format!("Contract language for {}.", id)).with_vector_distance(distance)
}

/// Five keyword hits, already in descending score order.
pub fn five_lexical_hits() -> Vec<Candidate> {
    vec![
        lexical_hit("c1", 9.0),
        lexical_hit("c2", 7.5),
        lexical_hit("c3", 6.0),
        lexical_hit("c4", 3.0),
        lexical_hit("c5", 1.0),
    ]
}
