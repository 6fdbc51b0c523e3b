//! Symptom interpretation: normalized text → canonical symptoms.
//!
//! Two passes over a synonym index. The phrase pass walks variants
//! longest-first and locks the canonical of every variant found as a
//! substring; the keyword pass then walks canonical names alphabetically and
//! picks up canonicals whose own name appears in the text. A canonical is
//! never counted twice: a phrase hit always wins over a keyword hit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::types::SynonymEntry;

/// Variant → canonical lookup, ordered for longest-match-first scanning.
#[derive(Debug, Clone)]
pub struct SynonymIndex {
    /// `(variant, canonical)` sorted by variant length descending,
    /// ties by variant ascending.
    variants: Vec<(String, String)>,
    canonicals: BTreeSet<String>,
}

impl SynonymIndex {
    pub fn build(entries: &[SynonymEntry]) -> Self {
        let mut variants: Vec<(String, String)> = entries
            .iter()
            .flat_map(|entry| {
                entry
                    .variants
                    .iter()
                    .map(|v| (v.clone(), entry.canonical.clone()))
            })
            .collect();
        variants.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });
        let canonicals = entries.iter().map(|e| e.canonical.clone()).collect();
        Self { variants, canonicals }
    }

    pub fn canonicals(&self) -> impl Iterator<Item = &str> {
        self.canonicals.iter().map(String::as_str)
    }

    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonicals.contains(name)
    }
}

/// One phrase-pass hit: the canonical and the variant that matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseHit {
    pub canonical: String,
    pub phrase: String,
}

/// Interpretation result. `canonicals` is the union of both passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomMatch {
    pub matched_phrases: Vec<PhraseHit>,
    pub matched_keyword_canonicals: Vec<String>,
    pub canonicals: BTreeSet<String>,
}

/// Interpret normalized text into canonical symptoms.
pub fn interpret(normalized_text: &str, index: &SynonymIndex) -> SymptomMatch {
    let mut locked: BTreeSet<String> = BTreeSet::new();
    let mut matched_phrases = Vec::new();
    let mut matched_keyword_canonicals = Vec::new();

    for (variant, canonical) in &index.variants {
        if locked.contains(canonical) {
            continue;
        }
        if normalized_text.contains(variant.as_str()) {
            matched_phrases.push(PhraseHit {
                canonical: canonical.clone(),
                phrase: variant.clone(),
            });
            locked.insert(canonical.clone());
        }
    }

    for canonical in index.canonicals() {
        if locked.contains(canonical) {
            continue;
        }
        if normalized_text.contains(canonical) {
            matched_keyword_canonicals.push(canonical.to_string());
            locked.insert(canonical.to_string());
        }
    }

    SymptomMatch {
        matched_phrases,
        matched_keyword_canonicals,
        canonicals: locked,
    }
}
