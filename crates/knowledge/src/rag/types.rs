//! Answer types.

use serde::{Deserialize, Serialize};

/// How sure the answer is, as reported by the model or forced by a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A reference from the answer to a retrieved candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub candidate_id: String,
    pub quote: String,
}

impl Citation {
    pub fn new(candidate_id: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            quote: quote.into(),
        }
    }
}

/// A grounded citation resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub candidate_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Structural label, or the document title when there is none
    pub location: String,

    pub quote: String,

    /// Where the reader can open the passage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    pub document_title: String,
}

/// Terminal state of one answer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Retrieval returned nothing
    NoEvidence,
    /// No model configured
    NoModel,
    /// Model call failed (transport or provider error)
    ModelUnavailable,
    /// Model call exceeded its time budget
    ModelTimeout,
    /// Model replied but the output failed parsing or schema checks
    ModelMalformed,
    /// Model output validated and was grounded
    Grounded,
}

impl AnswerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoEvidence => "no_evidence",
            Self::NoModel => "no_model",
            Self::ModelUnavailable => "model_unavailable",
            Self::ModelTimeout => "model_timeout",
            Self::ModelMalformed => "model_malformed",
            Self::Grounded => "grounded",
        }
    }

    /// True when the answer was built without a usable model reply.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Grounded)
    }
}

/// Final answer payload handed to the presentation layer.
///
/// Every `citations[i].candidate_id` refers to a candidate retrieved for this
/// request. Rendering `answer` is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub evidence: Vec<EvidenceItem>,
    pub assumptions: Vec<String>,
    pub confidence: Confidence,
    pub outcome: AnswerOutcome,
}

pub const NO_EVIDENCE_MESSAGE: &str = "No matching contract language was found. Please try rephrasing your question or review the table of contents for the contract.";

pub const MODEL_UNAVAILABLE_MESSAGE: &str =
    "Unable to contact the language model. Review the cited contract excerpts manually for details.";

pub const MODEL_MALFORMED_MESSAGE: &str =
    "The language model returned an unexpected response. Please review the cited passages directly.";

impl SynthesizedAnswer {
    /// Answer for a request whose retrieval came back empty.
    pub fn no_evidence() -> Self {
        Self {
            answer: NO_EVIDENCE_MESSAGE.to_string(),
            citations: Vec::new(),
            evidence: Vec::new(),
            assumptions: Vec::new(),
            confidence: Confidence::Low,
            outcome: AnswerOutcome::NoEvidence,
        }
    }

    /// Low-confidence answer that points the reader at excerpts.
    pub fn excerpts_only(
        outcome: AnswerOutcome,
        citations: Vec<Citation>,
        evidence: Vec<EvidenceItem>,
    ) -> Self {
        let message = match outcome {
            AnswerOutcome::ModelMalformed => MODEL_MALFORMED_MESSAGE,
            _ => MODEL_UNAVAILABLE_MESSAGE,
        };

        Self {
            answer: message.to_string(),
            citations,
            evidence,
            assumptions: Vec::new(),
            confidence: Confidence::Low,
            outcome,
        }
    }
}
