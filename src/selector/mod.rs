//! Next-question selection.
//!
//! Source order per turn: context → red-flag → discriminative. Context
//! questions fill the profile, red-flag questions chase danger signs behind
//! known symptoms, and discriminative questions maximize information gain
//! over the current Layer A candidates. A question is never repeated and
//! skip rules are honored unconditionally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogError};
use crate::envelope::QuestionPayload;
use crate::models::enums::AnswerType;
use crate::models::session::{ProfileField, Session};
use crate::scoring::candidates::CandidateDisease;

/// Discriminative-score bonus when a bank entry's `priority_when_known`
/// intersects the known symptoms.
const PRIORITY_BONUS: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Context,
    RedFlag,
    Discriminative,
}

/// A selected question plus the bookkeeping the turn handler needs.
#[derive(Debug, Clone)]
pub struct Selection {
    pub payload: QuestionPayload,
    pub source: QuestionSource,
    /// Set for context questions: the id to track in `asked_context_ids`.
    pub context_id: Option<String>,
    /// Set for discriminative questions: the winning score, for the
    /// minimum-expected-gain stop check.
    pub disc_score: Option<f64>,
}

/// Pick the next question, or `None` when every source is exhausted.
pub fn select_next_question(
    catalog: &Catalog,
    locale: &str,
    session: &Session,
    candidates: &[CandidateDisease],
) -> Result<Option<Selection>, CatalogError> {
    if let Some(selection) = select_context(catalog, locale, session) {
        return Ok(Some(selection));
    }
    if let Some(selection) = select_red_flag(catalog, locale, session) {
        return Ok(Some(selection));
    }
    select_discriminative(catalog, locale, session, candidates)
}

// ── Context ─────────────────────────────────────────────────

fn select_context(catalog: &Catalog, locale: &str, session: &Session) -> Option<Selection> {
    for question in &catalog.context_questions {
        if session.asked_context_ids.contains(&question.id) {
            continue;
        }
        if session.profile.is_set(question.profile_field) {
            continue;
        }
        if question.profile_field == ProfileField::Pregnancy && !pregnancy_applies(catalog, session)
        {
            continue;
        }
        if question.when_ask == crate::catalog::types::WhenAsk::WhenSymptomsAny
            && !question
                .when_symptoms_any
                .iter()
                .any(|s| session.known_symptoms.contains(s))
        {
            continue;
        }
        let Some(text) = catalog.localized(&question.question, locale) else {
            tracing::warn!(id = %question.id, locale, "Context question has no text for locale");
            continue;
        };
        let choices = question
            .choices
            .as_ref()
            .and_then(|by_locale| {
                by_locale
                    .get(locale)
                    .or_else(|| by_locale.get(&catalog.default_locale))
            })
            .cloned();
        return Some(Selection {
            payload: QuestionPayload {
                question_id: question.id.clone(),
                canonical: question.id.clone(),
                question_tr: text.to_string(),
                answer_type: question.answer_type,
                choices_tr: choices,
                why_asking_tr: None,
            },
            source: QuestionSource::Context,
            context_id: Some(question.id.clone()),
            disc_score: None,
        });
    }
    None
}

fn pregnancy_applies(catalog: &Catalog, session: &Session) -> bool {
    let female = session
        .profile
        .sex
        .as_deref()
        .map(|s| s.eq_ignore_ascii_case("female") || s == "kadın")
        .unwrap_or(false);
    female
        && catalog
            .pregnancy_relevant
            .iter()
            .any(|s| session.known_symptoms.contains(s))
}

// ── Red flags ───────────────────────────────────────────────

fn select_red_flag(catalog: &Catalog, locale: &str, session: &Session) -> Option<Selection> {
    for question in &catalog.red_flag_questions {
        if session.was_asked(&question.canonical) || session.was_asked(&question.id) {
            continue;
        }
        if session.known_symptoms.contains(&question.canonical)
            || session.denied_symptoms.contains(&question.canonical)
        {
            continue;
        }
        if catalog.is_skipped(&question.canonical, &session.denied_symptoms) {
            continue;
        }
        if !question
            .preconditions
            .iter()
            .all(|p| session.known_symptoms.contains(p))
        {
            continue;
        }
        let Some(text) = catalog.localized(&question.question, locale) else {
            tracing::warn!(id = %question.id, locale, "Red-flag question has no text for locale");
            continue;
        };
        return Some(Selection {
            payload: QuestionPayload {
                question_id: question.id.clone(),
                canonical: question.canonical.clone(),
                question_tr: text.to_string(),
                answer_type: AnswerType::YesNo,
                choices_tr: None,
                why_asking_tr: catalog.localized(&question.reason, locale).map(String::from),
            },
            source: QuestionSource::RedFlag,
            context_id: None,
            disc_score: None,
        });
    }
    None
}

// ── Discriminative ──────────────────────────────────────────

fn select_discriminative(
    catalog: &Catalog,
    locale: &str,
    session: &Session,
    candidates: &[CandidateDisease],
) -> Result<Option<Selection>, CatalogError> {
    if candidates.len() < 2 {
        return Ok(None);
    }
    let total = candidates.len() as f64;

    // How many candidates carry each kaggle symptom (matched ∪ missing is
    // exactly the candidate's full symptom set).
    let mut presence: BTreeMap<&str, usize> = BTreeMap::new();
    for candidate in candidates {
        for symptom in candidate
            .matched_symptoms
            .iter()
            .chain(&candidate.missing_symptoms)
        {
            *presence.entry(symptom.as_str()).or_insert(0) += 1;
        }
    }

    // Best score per canonical.
    let mut best: BTreeMap<String, f64> = BTreeMap::new();
    for (kaggle, count) in presence {
        let Some(canonical) = catalog.canonical_for_kaggle(kaggle) else {
            continue;
        };
        let Some(entry) = catalog.bank_entry(locale, canonical)? else {
            continue;
        };
        if session.known_symptoms.contains(canonical)
            || session.denied_symptoms.contains(canonical)
            || session.was_asked(canonical)
        {
            continue;
        }
        if catalog.is_skipped(canonical, &session.denied_symptoms) {
            continue;
        }

        let mut score = 1.0 - (count as f64 / total - 0.5).abs();
        if entry
            .priority_when_known
            .iter()
            .any(|p| session.known_symptoms.contains(p))
        {
            score += PRIORITY_BONUS;
        }

        best.entry(canonical.to_string())
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    // Order: score descending, canonical ascending.
    let winner = best.into_iter().max_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.0.cmp(&a.0))
    });
    let Some((canonical, score)) = winner else {
        return Ok(None);
    };

    let entry = catalog
        .bank_entry(locale, &canonical)?
        .expect("winning canonical has a bank entry");
    Ok(Some(Selection {
        payload: QuestionPayload {
            question_id: entry.canonical.clone(),
            canonical: entry.canonical.clone(),
            question_tr: entry.question.clone(),
            answer_type: entry.answer_type,
            choices_tr: entry.choices.clone(),
            why_asking_tr: entry.why_asking.clone(),
        },
        source: QuestionSource::Discriminative,
        context_id: None,
        disc_score: Some(score),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::scoring::candidates::generate_candidates;

    fn session_with(known: &[&str], denied: &[&str]) -> Session {
        let mut session = Session::new(
            "s-1".into(),
            "tr-TR".into(),
            chrono::Utc::now().naive_utc(),
        );
        // Filled profile keeps context questions out of the way.
        session.profile.age = Some(35);
        session.profile.sex = Some("male".into());
        session.profile.chronic.insert("yok".into());
        session.known_symptoms = known.iter().map(|s| s.to_string()).collect();
        session.denied_symptoms = denied.iter().map(|s| s.to_string()).collect();
        session
    }

    fn candidates_for(catalog: &Catalog, session: &Session) -> Vec<CandidateDisease> {
        generate_candidates(catalog, &session.known_symptoms)
    }

    // ── Context ─────────────────────────────────────────────

    #[test]
    fn fresh_session_asks_age_first() {
        let catalog = Catalog::load_test();
        let session = Session::new("s".into(), "tr-TR".into(), chrono::Utc::now().naive_utc());
        let selection = select_next_question(&catalog, "tr-TR", &session, &[])
            .unwrap()
            .unwrap();
        assert_eq!(selection.source, QuestionSource::Context);
        assert_eq!(selection.payload.question_id, "ctx_age");
        assert_eq!(selection.context_id.as_deref(), Some("ctx_age"));
    }

    #[test]
    fn context_walks_order_and_skips_filled_fields() {
        let catalog = Catalog::load_test();
        let mut session =
            Session::new("s".into(), "tr-TR".into(), chrono::Utc::now().naive_utc());
        session.profile.age = Some(30);
        let selection = select_next_question(&catalog, "tr-TR", &session, &[])
            .unwrap()
            .unwrap();
        assert_eq!(selection.payload.question_id, "ctx_sex");
        assert_eq!(selection.payload.choices_tr, Some(vec!["Kadın".to_string(), "Erkek".to_string()]));
    }

    #[test]
    fn pregnancy_needs_female_and_relevant_symptom() {
        let catalog = Catalog::load_test();
        let mut session =
            Session::new("s".into(), "tr-TR".into(), chrono::Utc::now().naive_utc());
        session.profile.age = Some(30);
        session.profile.sex = Some("female".into());

        // No pregnancy-relevant symptom → pregnancy is skipped entirely.
        session.known_symptoms.insert("öksürük".into());
        let selection = select_next_question(&catalog, "tr-TR", &session, &[]).unwrap();
        assert!(
            selection
                .as_ref()
                .map(|s| s.payload.question_id != "ctx_pregnancy")
                .unwrap_or(true),
            "pregnancy must not fire without a relevant symptom"
        );

        // Nausea is pregnancy-relevant.
        session.known_symptoms.insert("bulantı".into());
        let selection = select_next_question(&catalog, "tr-TR", &session, &[])
            .unwrap()
            .unwrap();
        assert_eq!(selection.payload.question_id, "ctx_pregnancy");
    }

    #[test]
    fn male_profile_never_gets_pregnancy_question() {
        let catalog = Catalog::load_test();
        let mut session = session_with(&["bulantı"], &[]);
        session.profile.chronic.clear();
        let candidates = candidates_for(&catalog, &session);
        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates)
            .unwrap()
            .unwrap();
        assert_ne!(selection.payload.question_id, "ctx_pregnancy");
    }

    // ── Red flags ───────────────────────────────────────────

    #[test]
    fn uti_triggers_fever_red_flag() {
        let catalog = Catalog::load_test();
        let session = session_with(&["idrarda yanma"], &[]);
        let candidates = candidates_for(&catalog, &session);
        // Single candidate: discriminative cannot run, red flag must.
        assert_eq!(candidates.len(), 1);

        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(selection.source, QuestionSource::RedFlag);
        assert_eq!(selection.payload.question_id, "rf_uti_fever");
        assert_eq!(selection.payload.canonical, "ateş");
        assert_eq!(selection.payload.answer_type, AnswerType::YesNo);
        assert!(selection.payload.why_asking_tr.is_some());
    }

    #[test]
    fn red_flag_not_repeated_once_asked() {
        let catalog = Catalog::load_test();
        let mut session = session_with(&["idrarda yanma"], &[]);
        session.note_asked("ateş");
        let candidates = candidates_for(&catalog, &session);
        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates).unwrap();
        assert!(selection.is_none(), "nothing left once the red flag was asked");
    }

    #[test]
    fn red_flag_skipped_when_answer_already_known() {
        let catalog = Catalog::load_test();
        let session = session_with(&["idrarda yanma", "ateş"], &[]);
        let candidates = candidates_for(&catalog, &session);
        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates).unwrap();
        if let Some(s) = selection {
            assert_ne!(s.payload.question_id, "rf_uti_fever");
        }
    }

    // ── Discriminative ──────────────────────────────────────

    #[test]
    fn discriminative_needs_at_least_two_candidates() {
        let catalog = Catalog::load_test();
        let mut session = session_with(&["idrarda yanma"], &[]);
        session.note_asked("ateş");
        session.deny_symptom("ateş", true);
        let candidates = candidates_for(&catalog, &session);
        assert_eq!(candidates.len(), 1);
        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates).unwrap();
        assert!(selection.is_none());
    }

    #[test]
    fn priority_boost_prefers_aura_question_for_headache() {
        let catalog = Catalog::load_test();
        let session = session_with(&["baş ağrısı", "bulantı"], &[]);
        let candidates = candidates_for(&catalog, &session);
        assert!(candidates.len() >= 2);

        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(selection.source, QuestionSource::Discriminative);
        // visual_disturbances: 1 of 4 candidates → disc 0.75, plus the
        // priority bonus for known "baş ağrısı" → 1.10, the unique maximum.
        assert_eq!(selection.payload.canonical, "bulanık görme");
        assert!((selection.disc_score.unwrap() - 1.10).abs() < 1e-9);
        assert!(selection.payload.why_asking_tr.is_some());
    }

    #[test]
    fn chest_pain_priority_questions_outrank_unboosted() {
        let catalog = Catalog::load_test();
        let session = session_with(&["göğüs ağrısı"], &[]);
        let candidates = candidates_for(&catalog, &session);
        assert_eq!(candidates.len(), 2, "Heart attack and Angina");

        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates)
            .unwrap()
            .unwrap();
        // breathlessness splits the candidates (1/2 → disc 1.0) and carries
        // the chest-pain priority bonus → 1.35.
        assert_eq!(selection.payload.canonical, "nefes darlığı");
        assert!((selection.disc_score.unwrap() - 1.35).abs() < 1e-9);
    }

    #[test]
    fn skip_rule_suppresses_phlegm_after_cough_denial() {
        let catalog = Catalog::load_test();
        let mut session = session_with(&["ateş"], &["öksürük"]);
        session.note_asked("öksürük");
        let candidates = candidates_for(&catalog, &session);
        assert!(candidates.len() >= 2);

        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates)
            .unwrap()
            .unwrap();
        assert_ne!(selection.payload.canonical, "balgam");
        assert_ne!(selection.payload.canonical, "öksürük süresi");
        // headache and breathlessness tie at disc 1.0; canonical ascending
        // puts "baş ağrısı" first.
        assert_eq!(selection.payload.canonical, "baş ağrısı");
    }

    #[test]
    fn asked_and_denied_canonicals_never_reappear() {
        let catalog = Catalog::load_test();
        let mut session = session_with(&["baş ağrısı", "bulantı"], &[]);
        session.note_asked("bulanık görme");
        session.deny_symptom("bulanık görme", true);
        let candidates = candidates_for(&catalog, &session);

        let selection = select_next_question(&catalog, "tr-TR", &session, &candidates)
            .unwrap()
            .unwrap();
        assert_ne!(selection.payload.canonical, "bulanık görme");
        assert!(!session.known_symptoms.contains(selection.payload.canonical.as_str()));
    }

    #[test]
    fn selection_is_deterministic() {
        let catalog = Catalog::load_test();
        let session = session_with(&["ateş", "baş ağrısı"], &[]);
        let candidates = candidates_for(&catalog, &session);
        let a = select_next_question(&catalog, "tr-TR", &session, &candidates).unwrap();
        let b = select_next_question(&catalog, "tr-TR", &session, &candidates).unwrap();
        assert_eq!(
            a.map(|s| s.payload.canonical),
            b.map(|s| s.payload.canonical)
        );
    }
}
