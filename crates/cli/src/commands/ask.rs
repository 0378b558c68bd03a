//! Ask command handler.
//!
//! Validates a question, answers it from the contract store and prints the
//! grounded answer with its evidence.

use super::setup::build_service;
use clap::Args;
use clause_core::{config::AppConfig, AppError, AppResult};
use clause_knowledge::{QueryRequest, SynthesizedAnswer};

/// Ask a question about a contract
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Corpus to search (default: store.defaultCorpus)
    #[arg(long)]
    pub corpus: Option<String>,

    /// Results requested from each search path
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Restrict results to these document ids
    #[arg(long = "document")]
    pub documents: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let corpus = self.corpus.as_deref().unwrap_or(&config.store.default_corpus);
        let request = QueryRequest::new(&self.question, corpus)?
            .with_limit(self.limit.unwrap_or(config.answer.result_limit))?
            .with_document_ids(self.documents.clone());

        let service = build_service(config)?;

        let answer = tokio::select! {
            answer = service.ask(&request) => answer,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, abandoning request");
                return Err(AppError::Other("Request cancelled".to_string()));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            print!("{}", render_text(&answer));
        }

        Ok(())
    }
}

/// Plain-text rendering for terminals.
fn render_text(answer: &SynthesizedAnswer) -> String {
    let mut out = format!("{}\n", answer.answer);

    if !answer.assumptions.is_empty() {
        out.push_str("\nAssumptions:\n");
        for assumption in &answer.assumptions {
            out.push_str(&format!("  - {}\n", assumption));
        }
    }

    if !answer.evidence.is_empty() {
        out.push_str("\nEvidence:\n");
        for (i, item) in answer.evidence.iter().enumerate() {
            out.push_str(&format!("  [{}] {} ({})\n", i + 1, item.location, item.document_title));
            out.push_str(&format!("      \"{}\"\n", item.quote));
            if let Some(ref link) = item.link {
                out.push_str(&format!("      {}\n", link));
            }
        }
    }

    out.push_str(&format!("\nConfidence: {}\n", answer.confidence.as_str()));
    out
}
