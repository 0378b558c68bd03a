//! Grounded answer synthesis.
//!
//! Every request ends in exactly one [`AnswerOutcome`]. Collaborator failures
//! are folded into the outcome here and never returned as errors.

use super::grounding::{ground, retain_grounded};
use super::output::{answer_schema, enforce_word_limit, parse_model_output, ModelAnswer, SCHEMA_NAME, TRUNCATION_MARKER};
use super::prompt::{build_user_prompt, system_instruction};
use super::types::{AnswerOutcome, Citation, SynthesizedAnswer};
use crate::types::Candidate;
use clause_core::config::AnswerSettings;
use clause_core::AppError;
use clause_llm::{LlmClient, LlmRequest};
use std::sync::Arc;
use std::time::Duration;

/// Result of one model round trip, before grounding.
enum ModelReply {
    Parsed(ModelAnswer),
    Unavailable(AppError),
    TimedOut,
    Malformed { error: AppError, raw: String },
}

/// Builds a [`SynthesizedAnswer`] from fused candidates.
pub struct AnswerSynthesizer {
    client: Option<Arc<dyn LlmClient>>,
    model: String,
    settings: AnswerSettings,
}

impl AnswerSynthesizer {
    /// Create a synthesizer. `client = None` means no model is configured.
    pub fn new(client: Option<Arc<dyn LlmClient>>, model: impl Into<String>, settings: AnswerSettings) -> Self {
        Self {
            client,
            model: model.into(),
            settings,
        }
    }

    /// Synthesizer that never calls a model.
    pub fn without_model(settings: AnswerSettings) -> Self {
        Self::new(None, String::new(), settings)
    }

    pub fn has_model(&self) -> bool {
        self.client.is_some()
    }

    pub fn settings(&self) -> &AnswerSettings {
        &self.settings
    }

    /// Produce an answer for `question` from ranked `candidates`.
    pub async fn synthesize(&self, question: &str, candidates: &[Candidate]) -> SynthesizedAnswer {
        if candidates.is_empty() {
            tracing::info!(outcome = AnswerOutcome::NoEvidence.as_str(), "No candidates retrieved");
            return SynthesizedAnswer::no_evidence();
        }

        let Some(client) = self.client.as_ref() else {
            tracing::info!(
                outcome = AnswerOutcome::NoModel.as_str(),
                candidates = candidates.len(),
                "No language model configured, citing top excerpts"
            );
            return self.fallback(AnswerOutcome::NoModel, candidates);
        };

        let context = &candidates[..candidates.len().min(self.settings.context_limit)];

        match self.call_model(client.as_ref(), question, context).await {
            ModelReply::Parsed(answer) => self.grounded(answer, candidates),
            ModelReply::Unavailable(error) => {
                tracing::warn!(
                    outcome = AnswerOutcome::ModelUnavailable.as_str(),
                    provider = client.provider_name(),
                    error = %error,
                    "Language model call failed"
                );
                self.fallback(AnswerOutcome::ModelUnavailable, candidates)
            }
            ModelReply::TimedOut => {
                tracing::warn!(
                    outcome = AnswerOutcome::ModelTimeout.as_str(),
                    provider = client.provider_name(),
                    timeout_secs = self.settings.model_timeout_secs,
                    "Language model call timed out"
                );
                self.fallback(AnswerOutcome::ModelTimeout, candidates)
            }
            ModelReply::Malformed { error, raw } => {
                tracing::error!(
                    outcome = AnswerOutcome::ModelMalformed.as_str(),
                    error = %error,
                    raw = %raw,
                    "Failed to parse model response"
                );
                self.fallback(AnswerOutcome::ModelMalformed, candidates)
            }
        }
    }

    async fn call_model(&self, client: &dyn LlmClient, question: &str, context: &[Candidate]) -> ModelReply {
        let prompt = match build_user_prompt(question, context) {
            Ok(prompt) => prompt,
            Err(error) => return ModelReply::Unavailable(error),
        };

        let request = LlmRequest::new(prompt, self.model.clone())
            .with_system(system_instruction(self.settings.word_limit))
            .with_temperature(0.3)
            .with_max_tokens(1000)
            .with_schema(SCHEMA_NAME, answer_schema(self.settings.word_limit));

        let budget = Duration::from_secs(self.settings.model_timeout_secs);
        let response = match tokio::time::timeout(budget, client.complete(&request)).await {
            Err(_) => return ModelReply::TimedOut,
            Ok(Err(error)) => return ModelReply::Unavailable(error),
            Ok(Ok(response)) => response,
        };

        tracing::debug!(
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Model replied"
        );

        match parse_model_output(&response.content) {
            Ok(answer) => ModelReply::Parsed(answer),
            Err(error) => ModelReply::Malformed {
                error,
                raw: response.content,
            },
        }
    }

    /// Keep citations that name any fused candidate, not only the context slice.
    fn grounded(&self, answer: ModelAnswer, candidates: &[Candidate]) -> SynthesizedAnswer {
        let proposed = answer.citations();
        let proposed_count = proposed.len();
        let citations = retain_grounded(proposed, candidates);
        let evidence = ground(&citations, candidates);

        tracing::info!(
            outcome = AnswerOutcome::Grounded.as_str(),
            citations = citations.len(),
            dropped = proposed_count - citations.len(),
            confidence = answer.confidence.as_str(),
            "Answer grounded"
        );

        SynthesizedAnswer {
            answer: enforce_word_limit(&answer.answer, self.settings.word_limit),
            citations,
            evidence,
            assumptions: answer.assumptions,
            confidence: answer.confidence,
            outcome: AnswerOutcome::Grounded,
        }
    }

    /// Cite the top candidates directly, quoting a bounded prefix of each.
    fn fallback(&self, outcome: AnswerOutcome, candidates: &[Candidate]) -> SynthesizedAnswer {
        let citations: Vec<Citation> = candidates
            .iter()
            .take(self.settings.fallback_citations)
            .map(|candidate| Citation::new(candidate.id.clone(), quote_prefix(&candidate.text, self.settings.quote_chars)))
            .collect();
        let evidence = ground(&citations, candidates);

        SynthesizedAnswer::excerpts_only(outcome, citations, evidence)
    }
}

/// First `max_chars` characters of `text`, marked when cut short.
fn quote_prefix(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{}", text[..end].trim_end(), TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_prefix() {
        assert_eq!(quote_prefix("short text", 200), "short text");
        assert_eq!(quote_prefix("abcdef", 3), "abc…");
        assert_eq!(quote_prefix("ééééé", 2), "éé…");
        assert_eq!(quote_prefix("abc", 3), "abc");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_no_evidence() {
        let synthesizer = AnswerSynthesizer::without_model(AnswerSettings::default());
        let answer = synthesizer.synthesize("How is overtime paid?", &[]).await;
        assert_eq!(answer.outcome, AnswerOutcome::NoEvidence);
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_respects_settings() {
        let settings = AnswerSettings {
            fallback_citations: 2,
            quote_chars: 5,
            ..Default::default()
        };
        let synthesizer = AnswerSynthesizer::without_model(settings);
        let candidates: Vec<Candidate> = (0..4)
            .map(|i| Candidate::new(format!("c{}", i), "NX", "Overtime rules apply").with_lexical_score(1.0))
            .collect();

        let answer = synthesizer.synthesize("How is overtime paid?", &candidates).await;
        assert_eq!(answer.outcome, AnswerOutcome::NoModel);
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].quote, "Overt…");
        assert_eq!(answer.evidence.len(), 2);
    }
}
