//! Question answering over a contract corpus.

use super::retriever::Retriever;
use super::synthesizer::AnswerSynthesizer;
use super::types::SynthesizedAnswer;
use crate::types::QueryRequest;
use tracing::Instrument;

/// Composes retrieval and synthesis for one request at a time.
///
/// Shared between requests; holds no per-request state. Dropping the future
/// returned by [`ask`](Self::ask) abandons any pending store or model work.
pub struct AnswerService {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl AnswerService {
    pub fn new(retriever: Retriever, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            retriever,
            synthesizer,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.synthesizer
    }

    /// Answer a validated question. Always returns a well-formed answer.
    pub async fn ask(&self, request: &QueryRequest) -> SynthesizedAnswer {
        let span = tracing::info_span!("answer", corpus = %request.corpus_key);

        async {
            tracing::info!(
                limit = request.limit,
                filtered = request.document_ids.is_some(),
                "Answering question"
            );

            let candidates = self.retriever.retrieve(request).await;
            let answer = self.synthesizer.synthesize(&request.question, &candidates).await;

            tracing::info!(
                outcome = answer.outcome.as_str(),
                candidates = candidates.len(),
                citations = answer.citations.len(),
                confidence = answer.confidence.as_str(),
                "Answer ready"
            );

            answer
        }
        .instrument(span)
        .await
    }
}
