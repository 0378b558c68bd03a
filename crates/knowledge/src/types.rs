//! Retrieval type definitions.

use chrono::{DateTime, Utc};
use clause_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata attached to a contract chunk.
///
/// Known keys are typed and optional; anything else lands in `extra` and is
/// written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Page numbers in the source document
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Source file or URL the chunk was extracted from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    /// Unknown upstream keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ChunkMetadata {
    /// Parse stored metadata, falling back to empty metadata when the JSON is
    /// malformed. Known keys with the wrong type are kept in `extra`.
    pub fn parse_lenient(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => Self::from_value_lenient(value),
            Err(e) => {
                tracing::debug!("Discarding unparseable chunk metadata: {}", e);
                Self::default()
            }
        }
    }

    /// Convert a JSON value without rejecting it.
    ///
    /// Non-objects yield empty metadata. A known key whose value has the wrong
    /// type is moved into `extra` instead of failing the whole record.
    pub fn from_value_lenient(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = value else {
            return Self::default();
        };

        let mut valid = serde_json::Map::new();
        let mut mistyped = BTreeMap::new();

        for (key, value) in map {
            let mut single = serde_json::Map::new();
            single.insert(key.clone(), value.clone());

            if serde_json::from_value::<Self>(serde_json::Value::Object(single)).is_ok() {
                valid.insert(key, value);
            } else {
                tracing::debug!(key = %key, "Keeping mistyped metadata key as extra");
                mistyped.insert(key, value);
            }
        }

        let mut metadata = serde_json::from_value::<Self>(serde_json::Value::Object(valid)).unwrap_or_default();
        metadata.extra.extend(mistyped);
        metadata
    }

    /// Serde adapter for records that embed metadata.
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_value_lenient(value))
    }

    /// Structural label such as "Article 12 Section B Overtime".
    pub fn structural_label(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.article, &self.section, &self.heading]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Title to show for the owning document.
    pub fn display_title(&self) -> String {
        self.document_title
            .clone()
            .or_else(|| self.source.clone())
            .unwrap_or_else(|| "Contract".to_string())
    }

    /// Human-readable page list, or "n/a".
    pub fn pages_label(&self) -> String {
        if self.pages.is_empty() {
            "n/a".to_string()
        } else {
            self.pages
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// A retrieved passage.
///
/// At least one of `lexical_score` / `vector_distance` is set by the search
/// path that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Stable chunk identifier
    pub id: String,

    /// Collection the chunk belongs to
    pub corpus_key: String,

    /// Passage content
    pub text: String,

    #[serde(default)]
    pub metadata: ChunkMetadata,

    /// Keyword relevance (higher is better)
    #[serde(default)]
    pub lexical_score: Option<f64>,

    /// Semantic distance (lower is better)
    #[serde(default)]
    pub vector_distance: Option<f64>,
}

impl Candidate {
    /// Create a candidate without relevance signals.
    pub fn new(id: impl Into<String>, corpus_key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            corpus_key: corpus_key.into(),
            text: text.into(),
            metadata: ChunkMetadata::default(),
            lexical_score: None,
            vector_distance: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_lexical_score(mut self, score: f64) -> Self {
        self.lexical_score = Some(score);
        self
    }

    pub fn with_vector_distance(mut self, distance: f64) -> Self {
        self.vector_distance = Some(distance);
        self
    }

    /// Fill relevance signals this record lacks from another record of the
    /// same chunk. Fields already set are kept.
    pub fn absorb(&mut self, other: Candidate) {
        debug_assert_eq!(self.id, other.id);
        self.lexical_score = self.lexical_score.or(other.lexical_score);
        self.vector_distance = self.vector_distance.or(other.vector_distance);
    }
}

/// A validated question against one corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub question: String,
    pub corpus_key: String,
    pub limit: usize,
    /// Restrict results to these documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ids: Option<Vec<String>>,
}

impl QueryRequest {
    pub const MIN_QUESTION_CHARS: usize = 8;
    pub const MAX_QUESTION_CHARS: usize = 1000;
    pub const DEFAULT_LIMIT: usize = 7;

    /// Validate and normalize an inbound question.
    ///
    /// The question is trimmed and must be 8–1000 characters; the corpus key
    /// is upper-cased.
    pub fn new(question: &str, corpus_key: &str) -> AppResult<Self> {
        let question = question.trim();
        let chars = question.chars().count();

        if chars < Self::MIN_QUESTION_CHARS {
            return Err(AppError::InvalidRequest(format!(
                "Please provide a question of at least {} characters",
                Self::MIN_QUESTION_CHARS
            )));
        }

        if chars > Self::MAX_QUESTION_CHARS {
            return Err(AppError::InvalidRequest(format!(
                "Question exceeds {} characters",
                Self::MAX_QUESTION_CHARS
            )));
        }

        let corpus_key = corpus_key.trim();
        if corpus_key.is_empty() {
            return Err(AppError::InvalidRequest(
                "Corpus key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            question: question.to_string(),
            corpus_key: corpus_key.to_uppercase(),
            limit: Self::DEFAULT_LIMIT,
            document_ids: None,
        })
    }

    /// Set the per-path result limit.
    pub fn with_limit(mut self, limit: usize) -> AppResult<Self> {
        if limit == 0 {
            return Err(AppError::InvalidRequest(
                "Result limit must be positive".to_string(),
            ));
        }
        self.limit = limit;
        Ok(self)
    }

    /// Restrict retrieval to the given document ids. An empty list means no filter.
    pub fn with_document_ids(mut self, document_ids: Vec<String>) -> Self {
        self.document_ids = if document_ids.is_empty() {
            None
        } else {
            Some(document_ids)
        };
        self
    }
}

/// A contract document known to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDocument {
    pub id: String,
    pub corpus_key: String,
    pub title: String,
    pub url: Option<String>,
    pub sha256: Option<String>,
    pub last_ingested_at: DateTime<Utc>,
}

/// Row counts for one corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub documents: u64,
    pub chunks: u64,
    pub embedded_chunks: u64,
}
