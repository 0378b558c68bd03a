use clause_knowledge::rag::grounding::{ground, retain_grounded};
use clause_knowledge::rag::output::enforce_word_limit;
use clause_knowledge::rag::{fuse, Citation};
use clause_knowledge::Candidate;
use proptest::prelude::*;
use std::collections::HashSet;

fn lexical_hits() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(("c[0-9]{1,2}", 0.0f64..50.0), 0..12).prop_map(|hits| {
        hits.into_iter()
            .map(|(id, score)| Candidate::new(id, "NX", "text").with_lexical_score(score))
            .collect()
    })
}

fn vector_hits() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(("c[0-9]{1,2}", 0.0f64..2.0), 0..12).prop_map(|hits| {
        hits.into_iter()
            .map(|(id, distance)| Candidate::new(id, "NX", "text").with_vector_distance(distance))
            .collect()
    })
}

fn ids(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.id.clone()).collect()
}

proptest! {
    #[test]
    fn fusion_is_deterministic(lexical in lexical_hits(), vector in vector_hits()) {
        let first = fuse(lexical.clone(), vector.clone());
        let second = fuse(lexical, vector);
        prop_assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn fusion_yields_each_id_once(lexical in lexical_hits(), vector in vector_hits()) {
        let expected: HashSet<String> = lexical.iter().chain(vector.iter()).map(|c| c.id.clone()).collect();
        let lexical_ids: HashSet<String> = lexical.iter().map(|c| c.id.clone()).collect();
        let vector_ids: HashSet<String> = vector.iter().map(|c| c.id.clone()).collect();
        let fused = fuse(lexical, vector);

        let seen: HashSet<String> = fused.iter().map(|c| c.id.clone()).collect();
        prop_assert_eq!(seen.len(), fused.len());
        prop_assert_eq!(seen, expected);

        // An id reported by both paths carries both signals
        for candidate in &fused {
            let in_lexical = lexical_ids.contains(&candidate.id);
            let in_vector = vector_ids.contains(&candidate.id);
            prop_assert_eq!(candidate.lexical_score.is_some(), in_lexical, "{}", candidate.id);
            prop_assert_eq!(candidate.vector_distance.is_some(), in_vector, "{}", candidate.id);
        }
    }

    #[test]
    fn vector_hits_order_by_distance(lexical in lexical_hits(), vector in vector_hits()) {
        prop_assume!(!vector.is_empty());
        let fused = fuse(lexical, vector);

        let distances: Vec<f64> = fused
            .iter()
            .map(|c| c.vector_distance.unwrap_or(f64::INFINITY))
            .collect();
        prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]), "{:?}", distances);
    }

    #[test]
    fn lexical_only_orders_by_score(lexical in lexical_hits()) {
        let fused = fuse(lexical, Vec::new());

        let scores: Vec<f64> = fused.iter().map(|c| c.lexical_score.unwrap_or(0.0)).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{:?}", scores);
    }

    #[test]
    fn grounded_citations_reference_candidates(
        lexical in lexical_hits(),
        cited in prop::collection::vec("c[0-9]{1,2}", 0..8),
    ) {
        let citations: Vec<Citation> = cited.iter().map(|id| Citation::new(id.as_str(), "quote")).collect();
        let known: HashSet<&str> = lexical.iter().map(|c| c.id.as_str()).collect();

        let evidence = ground(&citations, &lexical);
        prop_assert!(evidence.iter().all(|e| known.contains(e.candidate_id.as_str())));

        let kept = retain_grounded(citations, &lexical);
        prop_assert_eq!(kept.len(), evidence.len());
    }

    #[test]
    fn word_limit_caps_answers(text in "[a-z ]{0,400}", limit in 1usize..60) {
        let capped = enforce_word_limit(&text, limit);

        if text.split_whitespace().count() > limit {
            prop_assert!(capped.ends_with('…'));
            let words: Vec<&str> = capped.trim_end_matches('…').split_whitespace().collect();
            let expected: Vec<&str> = text.split_whitespace().take(limit).collect();
            prop_assert_eq!(words, expected);
        } else {
            prop_assert_eq!(capped.as_str(), text.trim());
        }
    }
}
