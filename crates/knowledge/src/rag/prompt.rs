//! Prompt construction for answer synthesis.

use crate::types::Candidate;
use clause_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// System instruction for the answer model.
pub fn system_instruction(word_limit: usize) -> String {
    format!(
        "You are UnionExplain, an assistant that answers questions about union contracts \
         using only the provided context. Respond in JSON following the supplied schema. \
         Keep the answer under {} words, cite only document ids from the context, and never \
         fabricate clauses. Mention any assumptions explicitly and avoid legal advice.",
        word_limit
    )
}

const CONTEXT_BLOCK: &str = "Document {{index}} (id: {{id}})
Location: {{location}}
Pages: {{pages}}
Text: {{text}}";

const USER_PROMPT: &str = "Question: {{question}}

Context:
{{context}}";

const CONTEXT_SEPARATOR: &str = "\n---\n";

#[derive(Serialize)]
struct ContextBlock<'a> {
    index: usize,
    id: &'a str,
    location: String,
    pages: String,
    text: &'a str,
}

#[derive(Serialize)]
struct UserPrompt<'a> {
    question: &'a str,
    context: &'a str,
}

fn templates() -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("context_block", CONTEXT_BLOCK)
        .map_err(|e| AppError::Knowledge(format!("Failed to register template: {}", e)))?;
    handlebars
        .register_template_string("user_prompt", USER_PROMPT)
        .map_err(|e| AppError::Knowledge(format!("Failed to register template: {}", e)))?;

    Ok(handlebars)
}

/// Render one block per candidate, joined by a `---` separator line.
pub fn build_context(candidates: &[Candidate]) -> AppResult<String> {
    let handlebars = templates()?;
    render_context(&handlebars, candidates)
}

fn render_context(handlebars: &Handlebars<'_>, candidates: &[Candidate]) -> AppResult<String> {
    let blocks = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let block = ContextBlock {
                index: i + 1,
                id: &candidate.id,
                location: candidate
                    .metadata
                    .structural_label()
                    .unwrap_or_else(|| "Unknown".to_string()),
                pages: candidate.metadata.pages_label(),
                text: &candidate.text,
            };
            handlebars
                .render("context_block", &block)
                .map_err(|e| AppError::Knowledge(format!("Failed to render context: {}", e)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(blocks.join(CONTEXT_SEPARATOR))
}

/// Render the user message: the question followed by the context blocks.
pub fn build_user_prompt(question: &str, candidates: &[Candidate]) -> AppResult<String> {
    let handlebars = templates()?;
    let context = render_context(&handlebars, candidates)?;

    handlebars
        .render(
            "user_prompt",
            &UserPrompt {
                question,
                context: &context,
            },
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to render prompt: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn sample() -> Vec<Candidate> {
        vec![
            Candidate::new("c1", "NX", "Overtime is paid at time and one-half.")
                .with_lexical_score(2.0)
                .with_metadata(ChunkMetadata {
                    article: Some("Article 12".to_string()),
                    heading: Some("Overtime".to_string()),
                    pages: vec![41, 42],
                    ..Default::default()
                }),
            Candidate::new("c2", "NX", "Nurses accrue vacation <monthly> & on leave.")
                .with_lexical_score(1.0),
        ]
    }

    #[test]
    fn test_context_blocks() {
        let context = build_context(&sample()).unwrap();
        assert_eq!(
            context,
            "Document 1 (id: c1)\nLocation: Article 12 Overtime\nPages: 41, 42\nText: Overtime is paid at time and one-half.\n---\nDocument 2 (id: c2)\nLocation: Unknown\nPages: n/a\nText: Nurses accrue vacation <monthly> & on leave."
        );
    }

    #[test]
    fn test_empty_context() {
        assert_eq!(build_context(&[]).unwrap(), "");
    }

    #[test]
    fn test_user_prompt() {
        let prompt = build_user_prompt("How is overtime paid?", &sample()).unwrap();
        assert!(prompt.starts_with("Question: How is overtime paid?\n\nContext:\nDocument 1 (id: c1)"));
    }

    #[test]
    fn test_system_instruction_mentions_limit() {
        let system = system_instruction(120);
        assert!(system.contains("under 120 words"));
        assert!(system.contains("never fabricate"));
    }
}
