//! Structured model output.
//!
//! The model is asked for JSON matching [`answer_schema`]. Whatever comes
//! back is parsed and checked here before anything downstream trusts it.

use super::types::{Citation, Confidence};
use clause_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Name the schema is registered under with the provider.
pub const SCHEMA_NAME: &str = "contract_answer";

/// Marker appended to answers cut at the word limit.
pub const TRUNCATION_MARKER: &str = "…";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelCitation {
    pub id: String,
    pub quote: String,
}

/// Model reply after schema validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelAnswer {
    pub answer: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    pub confidence: Confidence,
    pub citations: Vec<ModelCitation>,
}

impl ModelAnswer {
    pub fn citations(&self) -> Vec<Citation> {
        self.citations
            .iter()
            .map(|c| Citation::new(c.id.clone(), c.quote.clone()))
            .collect()
    }

    fn validate(self) -> AppResult<Self> {
        if self.citations.is_empty() {
            return Err(AppError::Llm(
                "Model answer must include at least one citation".to_string(),
            ));
        }

        if let Some(citation) = self.citations.iter().find(|c| c.quote.is_empty()) {
            return Err(AppError::Llm(format!(
                "Citation for '{}' has an empty quote",
                citation.id
            )));
        }

        Ok(self)
    }
}

/// JSON schema sent to the provider; `word_limit` matches the system instruction.
pub fn answer_schema(word_limit: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "answer": {
                "type": "string",
                "description": format!("Plain-language answer under {} words.", word_limit)
            },
            "assumptions": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of explicit assumptions made."
            },
            "confidence": {
                "type": "string",
                "enum": ["high", "medium", "low"],
                "description": "Confidence rating based on source clarity."
            },
            "citations": {
                "type": "array",
                "description": "Citations referencing document ids and relevant quotes.",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string", "description": "Document id from the provided context."},
                        "quote": {"type": "string", "description": "Short quote supporting the answer."}
                    },
                    "required": ["id", "quote"]
                },
                "minItems": 1
            }
        },
        "required": ["answer", "confidence", "citations"]
    })
}

/// Parse and validate raw model text.
///
/// Surrounding whitespace and a single markdown code fence are tolerated;
/// anything else that is not schema-conforming JSON is an error.
pub fn parse_model_output(raw: &str) -> AppResult<ModelAnswer> {
    let body = strip_code_fence(raw.trim());
    let answer: ModelAnswer = serde_json::from_str(body)?;
    answer.validate()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };

    // Drop an info string such as "json" on the opening line
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

/// Cap `text` at `limit` whitespace-separated words.
///
/// Truncated text is re-joined with single spaces and ends with
/// [`TRUNCATION_MARKER`]; text within the limit is only trimmed.
pub fn enforce_word_limit(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.trim().to_string();
    }

    format!("{}{}", words[..limit].join(" "), TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "answer": "Overtime is paid at one and one-half times the base rate.",
        "confidence": "high",
        "citations": [{"id": "c1", "quote": "time and one-half"}]
    }"#;

    #[test]
    fn test_parse_valid_output() {
        let answer = parse_model_output(VALID).unwrap();
        assert_eq!(answer.confidence, Confidence::High);
        assert!(answer.assumptions.is_empty());
        assert_eq!(answer.citations(), vec![Citation::new("c1", "time and one-half")]);
    }

    #[test]
    fn test_parse_fenced_output() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(parse_model_output(&fenced).is_ok());

        let bare_fence = format!("```{}```", VALID);
        assert!(parse_model_output(&bare_fence).is_ok());
    }

    #[test]
    fn test_missing_citations_rejected() {
        let raw = r#"{"answer": "Yes.", "confidence": "low"}"#;
        assert!(parse_model_output(raw).is_err());
    }

    #[test]
    fn test_empty_citations_rejected() {
        let raw = r#"{"answer": "Yes.", "confidence": "low", "citations": []}"#;
        assert!(parse_model_output(raw).is_err());
    }

    #[test]
    fn test_empty_quote_rejected() {
        let raw = r#"{"answer": "Yes.", "confidence": "low", "citations": [{"id": "c1", "quote": ""}]}"#;
        assert!(parse_model_output(raw).is_err());
    }

    #[test]
    fn test_bad_confidence_rejected() {
        let raw = r#"{"answer": "Yes.", "confidence": "certain", "citations": [{"id": "c1", "quote": "q"}]}"#;
        assert!(parse_model_output(raw).is_err());
    }

    #[test]
    fn test_prose_rejected() {
        assert!(parse_model_output("I think overtime is paid weekly.").is_err());
        assert!(parse_model_output("").is_err());
    }

    #[test]
    fn test_word_limit() {
        assert_eq!(enforce_word_limit("  one two three  ", 3), "one two three");
        assert_eq!(enforce_word_limit("one  two\nthree four", 2), "one two…");
        assert_eq!(enforce_word_limit("", 5), "");
    }

    #[test]
    fn test_schema_requires_citations() {
        let schema = answer_schema(120);
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("citations")));
        assert_eq!(schema["properties"]["citations"]["minItems"], 1);
        assert_eq!(
            answer_schema(80)["properties"]["answer"]["description"],
            "Plain-language answer under 80 words."
        );
    }
}
