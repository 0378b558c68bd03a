//! Hybrid result fusion.
//!
//! Lexical and vector searches run independently; this module merges their
//! result lists into one ranked candidate sequence.
//!
//! Ranking is decided for the whole set, not per pair: once any candidate
//! carries a finite vector distance, every candidate is ordered by distance
//! and candidates without one sort last.

use crate::types::Candidate;
use std::collections::HashMap;

/// Merge lexical and vector results into one deduplicated, ranked list.
///
/// Vector results are visited first, so when both paths report a field for
/// the same id the vector record's value wins. The output is not capped.
pub fn fuse(lexical: Vec<Candidate>, vector: Vec<Candidate>) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(lexical.len() + vector.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for candidate in vector.into_iter().chain(lexical) {
        match positions.get(&candidate.id) {
            Some(&index) => merged[index].absorb(candidate),
            None => {
                positions.insert(candidate.id.clone(), merged.len());
                merged.push(candidate);
            }
        }
    }

    let vector_mode = merged.iter().any(|c| finite_distance(c).is_some());

    // Stable sort: equal keys keep first-seen order
    if vector_mode {
        merged.sort_by(|a, b| {
            distance_key(a)
                .total_cmp(&distance_key(b))
                .then_with(|| score_key(b).total_cmp(&score_key(a)))
        });
    } else {
        merged.sort_by(|a, b| score_key(b).total_cmp(&score_key(a)));
    }

    tracing::debug!(
        candidates = merged.len(),
        vector_mode,
        "Fused retrieval results"
    );

    merged
}

fn finite_distance(candidate: &Candidate) -> Option<f64> {
    candidate.vector_distance.filter(|d| d.is_finite())
}

fn distance_key(candidate: &Candidate) -> f64 {
    finite_distance(candidate).unwrap_or(f64::INFINITY)
}

fn score_key(candidate: &Candidate) -> f64 {
    match candidate.lexical_score {
        Some(score) if !score.is_nan() => score,
        _ => 0.0,
    }
}
