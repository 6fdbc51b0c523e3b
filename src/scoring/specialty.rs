//! Layer B: keyword-driven specialty scoring.
//!
//! Phrase hits from the interpreter score 5, keyword hits 3, negative
//! keywords −4, with the guarantee that one canonical never scores twice in
//! the same specialty. The per-specialty trace survives into the debug
//! record and the why-specialty lines of the final envelope.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::text::interpret::{PhraseHit, SymptomMatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyScore {
    pub specialty_id: String,
    pub name_tr: String,
    pub score: i32,
    /// Keyword-pass points only; the second tie-breaker.
    pub keyword_score: i32,
    pub phrase_hits: Vec<PhraseHit>,
    pub keyword_hits: Vec<String>,
    pub negative_hits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyScoring {
    /// Specialties with at least one hit, best first.
    pub ranked: Vec<SpecialtyScore>,
    /// Set when the two best specialties have equal scores.
    pub top_tie: bool,
}

impl SpecialtyScoring {
    pub fn score_for(&self, specialty_id: &str) -> Option<&SpecialtyScore> {
        self.ranked.iter().find(|s| s.specialty_id == specialty_id)
    }
}

/// Score every specialty against one turn's text.
pub fn score_specialties(
    catalog: &Catalog,
    normalized_text: &str,
    interpretation: &SymptomMatch,
) -> SpecialtyScoring {
    let scoring = &catalog.scoring;
    let mut ranked: Vec<SpecialtyScore> = Vec::new();

    for entry in &catalog.specialties {
        let keywords: BTreeSet<&str> = entry.keywords.iter().map(String::as_str).collect();
        let mut scored: BTreeSet<&str> = BTreeSet::new();

        let mut score = 0;
        let mut keyword_score = 0;
        let mut phrase_hits = Vec::new();
        let mut keyword_hits = Vec::new();
        let mut negative_hits = Vec::new();

        for hit in &interpretation.matched_phrases {
            if scored.contains(hit.canonical.as_str()) {
                continue;
            }
            if keywords.contains(hit.canonical.as_str()) || keywords.contains(hit.phrase.as_str()) {
                score += scoring.phrase_match_points;
                phrase_hits.push(hit.clone());
                scored.insert(hit.canonical.as_str());
            }
        }

        for canonical in &interpretation.matched_keyword_canonicals {
            if scored.contains(canonical.as_str()) {
                continue;
            }
            if keywords.contains(canonical.as_str()) {
                score += scoring.keyword_match_points;
                keyword_score += scoring.keyword_match_points;
                keyword_hits.push(canonical.clone());
                scored.insert(canonical.as_str());
            }
        }

        for negative in &entry.negative_keywords {
            if normalized_text.contains(negative.as_str()) {
                score += scoring.negative_keyword_penalty;
                negative_hits.push(negative.clone());
            }
        }

        if phrase_hits.is_empty() && keyword_hits.is_empty() && negative_hits.is_empty() {
            continue;
        }
        ranked.push(SpecialtyScore {
            specialty_id: entry.id.clone(),
            name_tr: entry.name_tr.clone(),
            score,
            keyword_score,
            phrase_hits,
            keyword_hits,
            negative_hits,
        });
    }

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.keyword_score.cmp(&a.keyword_score))
            .then_with(|| a.specialty_id.cmp(&b.specialty_id))
    });

    let top_tie = ranked.len() >= 2 && ranked[0].score == ranked[1].score;
    SpecialtyScoring { ranked, top_tie }
}
