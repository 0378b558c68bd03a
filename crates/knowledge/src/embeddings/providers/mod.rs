//! Embedding provider implementations.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiEmbeddingProvider;
