//! Layer A: candidate disease generation.
//!
//! Weighted Jaccard between the user's symptoms and each disease's symptom
//! set, both in kaggle space. Severity-weighted so that a shared severe
//! symptom counts for more than a shared mild one. Pure function of catalog
//! and input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// One ranked candidate with its symptom overlap, in kaggle space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDisease {
    pub disease_label: String,
    pub score_0_1: f64,
    pub matched_symptoms: Vec<String>,
    pub missing_symptoms: Vec<String>,
}

/// Rank diseases against the user's canonical symptoms.
///
/// Returns at most `top_k` candidates with score ≥ `min_score_to_include`,
/// ordered by score descending, ties by label ascending. An empty symptom
/// set yields an empty list.
pub fn generate_candidates(
    catalog: &Catalog,
    user_canonicals: &BTreeSet<String>,
) -> Vec<CandidateDisease> {
    let user_kaggle: BTreeSet<&str> = user_canonicals
        .iter()
        .flat_map(|canonical| catalog.kaggle_for(canonical))
        .map(String::as_str)
        .collect();

    if user_kaggle.is_empty() {
        return Vec::new();
    }

    let cfg = &catalog.candidate_generator;
    let mut candidates: Vec<CandidateDisease> = Vec::new();

    for (disease_label, disease_symptoms) in &catalog.disease_symptoms {
        let mut intersection_weight = 0.0;
        let mut union_weight = 0.0;
        let mut matched = Vec::new();
        let mut missing = Vec::new();

        for symptom in disease_symptoms {
            let weight = catalog.symptom_weight(symptom);
            union_weight += weight;
            if user_kaggle.contains(symptom.as_str()) {
                intersection_weight += weight;
                matched.push(symptom.clone());
            } else {
                missing.push(symptom.clone());
            }
        }
        for symptom in &user_kaggle {
            if !disease_symptoms.contains(*symptom) {
                union_weight += catalog.symptom_weight(symptom);
            }
        }

        if union_weight <= 0.0 {
            continue;
        }
        let score = intersection_weight / union_weight;
        if score >= cfg.min_score_to_include {
            candidates.push(CandidateDisease {
                disease_label: disease_label.clone(),
                score_0_1: score,
                matched_symptoms: matched,
                missing_symptoms: missing,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.score_0_1
            .partial_cmp(&a.score_0_1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.disease_label.cmp(&b.disease_label))
    });
    candidates.truncate(cfg.top_k);
    candidates
}
