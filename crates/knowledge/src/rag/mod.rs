//! Grounded question answering over contract passages.
//!
//! Retrieval fuses keyword and vector hits; synthesis asks a model for a
//! structured answer and keeps only citations that point at retrieved
//! passages. Every path ends in a [`SynthesizedAnswer`].

pub mod fusion;
pub mod grounding;
pub mod output;
pub mod prompt;
pub mod retriever;
pub mod service;
pub mod synthesizer;
pub mod types;

pub use fusion::fuse;
pub use grounding::ground;
pub use retriever::Retriever;
pub use service::AnswerService;
pub use synthesizer::AnswerSynthesizer;
pub use types::{AnswerOutcome, Citation, Confidence, EvidenceItem, SynthesizedAnswer};
