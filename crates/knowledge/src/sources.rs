//! Registry of known contract corpora.

use serde::Serialize;

/// Kind of document within a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    Contract,
    Appendix,
    SideLetter,
    Mou,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Appendix => "appendix",
            Self::SideLetter => "sideLetter",
            Self::Mou => "mou",
        }
    }
}

/// Maps a document URL or title fragment to a document kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRule {
    pub name: &'static str,
    /// Literal lower-case substrings, not patterns; any match selects the rule
    pub patterns: &'static [&'static str],
    pub kind: DocumentKind,
}

/// A corpus the system knows how to describe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSource {
    pub corpus_key: &'static str,
    pub display_name: &'static str,
    pub seed_urls: &'static [&'static str],
    pub rules: &'static [DocumentRule],
    pub schema_version: &'static str,
}

impl ContractSource {
    /// Classify a document by its URL or title; first matching rule wins.
    ///
    /// Matching is a case-insensitive substring test against each fragment.
    pub fn classify(&self, reference: &str) -> Option<DocumentKind> {
        let reference = reference.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| reference.contains(p)))
            .map(|rule| rule.kind)
    }
}

static SOURCES: &[ContractSource] = &[ContractSource {
    corpus_key: "NX",
    display_name: "UC Registered Nurses (NX Unit)",
    seed_urls: &["https://ucnet.universityofcalifornia.edu/resources/employment-policies-contracts/bargaining-units/registered-nurses/contract/"],
    rules: &[
        DocumentRule {
            name: "Contract PDF",
            patterns: &["registered-nurses-contract"],
            kind: DocumentKind::Contract,
        },
        DocumentRule {
            name: "Appendix",
            patterns: &["appendix"],
            kind: DocumentKind::Appendix,
        },
        DocumentRule {
            name: "Side Letter",
            patterns: &["side-letter"],
            kind: DocumentKind::SideLetter,
        },
        DocumentRule {
            name: "Memorandum of Understanding",
            patterns: &["mou", "memorandum"],
            kind: DocumentKind::Mou,
        },
    ],
    schema_version: "2024-06-01",
}];

/// All registered corpora.
pub fn contract_sources() -> &'static [ContractSource] {
    SOURCES
}

/// Case-insensitive lookup by corpus key.
pub fn get_contract_source(corpus_key: &str) -> Option<&'static ContractSource> {
    SOURCES
        .iter()
        .find(|source| source.corpus_key.eq_ignore_ascii_case(corpus_key.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let source = get_contract_source("nx").unwrap();
        assert_eq!(source.display_name, "UC Registered Nurses (NX Unit)");
        assert_eq!(source.schema_version, "2024-06-01");
        assert!(get_contract_source(" NX ").is_some());
        assert!(get_contract_source("BX").is_none());
    }

    #[test]
    fn test_classify() {
        let source = get_contract_source("NX").unwrap();
        assert_eq!(
            source.classify("https://ucnet.example/registered-nurses-contract-2022.pdf"),
            Some(DocumentKind::Contract)
        );
        assert_eq!(source.classify("NX Side-Letter 4.pdf"), Some(DocumentKind::SideLetter));
        assert_eq!(source.classify("Memorandum on staffing"), Some(DocumentKind::Mou));
        assert_eq!(source.classify("benefits-summary.pdf"), None);
        // Fragments are literal: no wildcard between words
        assert_eq!(source.classify("side_letter_4.pdf"), None);
    }

    #[test]
    fn test_registry_serializes() {
        let json = serde_json::to_value(contract_sources()).unwrap();
        assert_eq!(json[0]["corpusKey"], "NX");
        assert_eq!(json[0]["rules"][2]["kind"], "sideLetter");
    }
}
