//! Citation grounding.
//!
//! Model citations are untrusted. Only citations whose id names a candidate
//! retrieved for the request survive; the rest are dropped.

use super::types::{Citation, EvidenceItem};
use crate::types::{Candidate, ChunkMetadata};
use std::collections::HashMap;

/// Resolve citations against the candidate set, dropping dangling ids.
///
/// The result is never longer than `citations` and keeps their order.
pub fn ground(citations: &[Citation], candidates: &[Candidate]) -> Vec<EvidenceItem> {
    let by_id: HashMap<&str, &Candidate> = candidates.iter().map(|c| (c.id.as_str(), c)).collect();

    citations
        .iter()
        .filter_map(|citation| match by_id.get(citation.candidate_id.as_str()) {
            Some(candidate) => Some(evidence_for(citation, candidate)),
            None => {
                tracing::debug!(
                    candidate_id = %citation.candidate_id,
                    "Dropping citation for unknown candidate"
                );
                None
            }
        })
        .collect()
}

/// Keep only citations that point at a known candidate.
pub fn retain_grounded(citations: Vec<Citation>, candidates: &[Candidate]) -> Vec<Citation> {
    citations
        .into_iter()
        .filter(|citation| candidates.iter().any(|c| c.id == citation.candidate_id))
        .collect()
}

pub(crate) fn evidence_for(citation: &Citation, candidate: &Candidate) -> EvidenceItem {
    let metadata = &candidate.metadata;
    let document_title = metadata.display_title();

    EvidenceItem {
        candidate_id: candidate.id.clone(),
        article: metadata.article.clone(),
        section: metadata.section.clone(),
        location: metadata
            .structural_label()
            .unwrap_or_else(|| document_title.clone()),
        quote: citation.quote.clone(),
        link: evidence_link(metadata),
        document_title,
    }
}

/// Explicit URL, else `source#page=N` for the first page, else nothing.
fn evidence_link(metadata: &ChunkMetadata) -> Option<String> {
    if let Some(url) = metadata.url.as_deref().filter(|u| !u.trim().is_empty()) {
        return Some(url.to_string());
    }

    match (metadata.source.as_deref(), metadata.pages.first()) {
        (Some(source), Some(page)) if !source.trim().is_empty() => {
            Some(format!("{}#page={}", source, page))
        }
        _ => None,
    }
}
