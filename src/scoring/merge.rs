//! A+B decision merger.
//!
//! Layer A candidates vote for specialties through the disease→specialty
//! mapping, weighted by rank points and mapping confidence; Layer B
//! contributes its rule score directly. Either layer may be empty.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::scoring::candidates::CandidateDisease;
use crate::scoring::specialty::SpecialtyScoring;

/// Points granted by Layer A rank (1-based).
const RANK_POINTS: [f64; 5] = [4.0, 3.0, 2.0, 1.0, 1.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedSpecialty {
    pub specialty_id: String,
    pub name_tr: String,
    pub final_score: f64,
    pub rules_score: i32,
    pub keyword_score: i32,
    pub prior_score: f64,
}

/// Merge candidate priors and rule scores into one deterministic ranking.
pub fn merge_decision(
    catalog: &Catalog,
    candidates: &[CandidateDisease],
    rules: &SpecialtyScoring,
) -> Vec<MergedSpecialty> {
    let mut priors: BTreeMap<&str, f64> = BTreeMap::new();
    for (rank, candidate) in candidates.iter().take(RANK_POINTS.len()).enumerate() {
        if let Some(mapping) = catalog.disease_to_specialty.get(&candidate.disease_label) {
            *priors.entry(mapping.id.as_str()).or_insert(0.0) +=
                RANK_POINTS[rank] * mapping.confidence;
        }
    }

    let mut specialty_ids: BTreeSet<&str> = priors.keys().copied().collect();
    for scored in &rules.ranked {
        specialty_ids.insert(scored.specialty_id.as_str());
    }

    let mut merged: Vec<MergedSpecialty> = specialty_ids
        .into_iter()
        .map(|id| {
            let prior_score = priors.get(id).copied().unwrap_or(0.0);
            let (rules_score, keyword_score) = rules
                .score_for(id)
                .map(|s| (s.score, s.keyword_score))
                .unwrap_or((0, 0));
            MergedSpecialty {
                specialty_id: id.to_string(),
                name_tr: catalog.specialty_name_tr(id),
                final_score: f64::from(rules_score) + prior_score,
                rules_score,
                keyword_score,
                prior_score,
            }
        })
        .collect();

    merged.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.keyword_score.cmp(&a.keyword_score))
            .then_with(|| a.specialty_id.cmp(&b.specialty_id))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::candidates::generate_candidates;
    use crate::scoring::specialty::score_specialties;
    use crate::text::interpret::interpret;
    use crate::text::normalize::normalize;

    fn empty_rules() -> SpecialtyScoring {
        SpecialtyScoring { ranked: Vec::new(), top_tie: false }
    }

    fn candidates_for(catalog: &Catalog, canonicals: &[&str]) -> Vec<CandidateDisease> {
        let set = canonicals.iter().map(|c| c.to_string()).collect();
        generate_candidates(catalog, &set)
    }

    #[test]
    fn priors_alone_drive_when_rules_are_empty() {
        let catalog = Catalog::load_test();
        let candidates = candidates_for(&catalog, &["idrarda yanma"]);
        let merged = merge_decision(&catalog, &candidates, &empty_rules());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].specialty_id, "urology_internal");
        // Rank 1 → 4 points × 0.9 confidence.
        assert!((merged[0].prior_score - 3.6).abs() < 1e-9);
        assert!((merged[0].final_score - 3.6).abs() < 1e-9);
        assert_eq!(merged[0].rules_score, 0);
    }

    #[test]
    fn rules_alone_drive_when_candidates_are_empty() {
        let catalog = Catalog::load_test();
        let normalized = normalize("göğsüm ağrıyor");
        let interpretation = interpret(&normalized, &catalog.synonym_index);
        let rules = score_specialties(&catalog, &normalized, &interpretation);

        let merged = merge_decision(&catalog, &[], &rules);
        assert_eq!(merged[0].specialty_id, "cardiology");
        assert!((merged[0].final_score - 5.0).abs() < 1e-9);
        assert!((merged[0].prior_score - 0.0).abs() < 1e-9);
    }

    #[test]
    fn prior_and_rules_add_up() {
        let catalog = Catalog::load_test();
        let normalized = normalize("başım ağrıyor ve midem bulanıyor");
        let interpretation = interpret(&normalized, &catalog.synonym_index);
        let rules = score_specialties(&catalog, &normalized, &interpretation);
        let candidates = candidates_for(&catalog, &["baş ağrısı", "bulantı"]);

        let merged = merge_decision(&catalog, &candidates, &rules);
        let neurology = merged
            .iter()
            .find(|m| m.specialty_id == "neurology")
            .unwrap();
        // Rules: phrase "başım ağrıyor" → +5. Prior: Migraine at rank 1 →
        // 4 × 0.9 = 3.6.
        assert_eq!(neurology.rules_score, 5);
        assert!((neurology.prior_score - 3.6).abs() < 1e-9);
        assert!((neurology.final_score - 8.6).abs() < 1e-9);
        assert_eq!(merged[0].specialty_id, "neurology");
    }

    #[test]
    fn rank_points_decay_with_position() {
        let catalog = Catalog::load_test();
        // Feverish respiratory picture: Pneumonia and Influenza both rank.
        let candidates = candidates_for(&catalog, &["ateş", "öksürük", "balgam"]);
        assert!(candidates.len() >= 2);
        let merged = merge_decision(&catalog, &candidates, &empty_rules());

        let first_specialty = &catalog
            .disease_to_specialty[&candidates[0].disease_label];
        let top = merged
            .iter()
            .find(|m| m.specialty_id == first_specialty.id)
            .unwrap();
        assert!((top.prior_score - 4.0 * first_specialty.confidence).abs() < 1e-9);
    }

    #[test]
    fn everything_empty_yields_empty_ranking() {
        let catalog = Catalog::load_test();
        assert!(merge_decision(&catalog, &[], &empty_rules()).is_empty());
    }
}
