//! Contract knowledge: storage, hybrid retrieval and grounded answers.
//!
//! Provides local-first question answering over labor-contract passages
//! using SQLite (FTS5 keyword search plus stored embeddings) and an optional
//! language model.

pub mod embeddings;
pub mod ingest;
pub mod rag;
pub mod sources;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{EmbeddingProvider, QueryEmbedder};
pub use ingest::{load_corpus, IngestOptions, IngestStats};
pub use rag::{AnswerOutcome, AnswerService, AnswerSynthesizer, Confidence, Retriever, SynthesizedAnswer};
pub use sources::{contract_sources, get_contract_source, ContractSource};
pub use store::{ContractStore, SqliteStore};
pub use types::{Candidate, ChunkMetadata, ContractDocument, QueryRequest, StoreStats};
