//! Question-budget and urgency policy.
//!
//! The question budget shrinks on the emergency track: when the leading
//! specialty is in the emergency set, or the leading candidate disease
//! carries an emergency keyword, the loop gets fewer turns before routing.

use crate::catalog::Catalog;
use crate::models::enums::Urgency;
use crate::models::session::Session;
use crate::scoring::candidates::CandidateDisease;
use crate::scoring::merge::MergedSpecialty;

/// Maximum questions for the current picture.
pub fn effective_max_questions(
    catalog: &Catalog,
    merged: &[MergedSpecialty],
    candidates: &[CandidateDisease],
) -> u32 {
    let rules = &catalog.stop_rules;

    let top_specialty_is_emergency = merged.first().is_some_and(|top| {
        rules
            .emergency_specialty_ids
            .iter()
            .any(|id| *id == top.specialty_id)
    });
    let top_disease_is_emergency = candidates.first().is_some_and(|top| {
        let label = top.disease_label.to_lowercase();
        rules
            .emergency_disease_keywords
            .iter()
            .any(|keyword| label.contains(&keyword.to_lowercase()))
    });

    if top_specialty_is_emergency || top_disease_is_emergency {
        rules.max_questions_emergency
    } else {
        rules.max_questions
    }
}

/// Whether the session has used up its question budget.
pub fn max_questions_reached(
    catalog: &Catalog,
    session: &Session,
    merged: &[MergedSpecialty],
    candidates: &[CandidateDisease],
) -> bool {
    session.turn_index >= effective_max_questions(catalog, merged, candidates)
}

/// Routing urgency for a specialty, optionally lifted by a same-day banner.
pub fn derive_urgency(catalog: &Catalog, specialty_id: &str, same_day: bool) -> Urgency {
    let base = catalog.urgency_for_specialty(specialty_id);
    if same_day && matches!(base, Urgency::Routine | Urgency::Within3Days) {
        return Urgency::SameDay;
    }
    base
}
