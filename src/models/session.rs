//! Session state: the single mutable record of a triage conversation.
//!
//! Owned by the store, mutated only by the turn handler. Everything here is
//! serde-serializable so a session survives a store round-trip bytewise.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::envelope::{EnvelopeType, QuestionPayload};
use crate::models::enums::{StopReason, Timing};
use crate::scoring::candidates::CandidateDisease;
use crate::scoring::merge::MergedSpecialty;
use crate::scoring::specialty::SpecialtyScoring;

/// Which profile slot a context question fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Age,
    Sex,
    Pregnancy,
    Chronic,
}

/// Optional patient profile collected through context questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pregnant: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub chronic: BTreeSet<String>,
}

impl Profile {
    /// Whether the given slot already holds a value (context question skip).
    pub fn is_set(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Age => self.age.is_some(),
            ProfileField::Sex => self.sex.is_some(),
            ProfileField::Pregnancy => self.pregnant.is_some(),
            ProfileField::Chronic => !self.chronic.is_empty(),
        }
    }

    /// Merge fields provided by the transport; provided values win.
    pub fn merge(&mut self, other: &Profile) {
        if other.age.is_some() {
            self.age = other.age;
        }
        if other.sex.is_some() {
            self.sex = other.sex.clone();
        }
        if other.pregnant.is_some() {
            self.pregnant = other.pregnant;
        }
        if !other.chronic.is_empty() {
            self.chronic.extend(other.chronic.iter().cloned());
        }
    }
}

/// Structured fields extracted from a free-text answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnswer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_0_10: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

impl ParsedAnswer {
    pub fn is_empty(&self) -> bool {
        self.duration_days.is_none() && self.severity_0_10.is_none() && self.timing.is_none()
    }
}

/// Scoring and selection traces kept for auditability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugTrace {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CandidateDisease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<SpecialtyScoring>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged: Vec<MergedSpecialty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_note: Option<String>,
}

/// One triage conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub locale: String,
    pub turn_index: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub known_symptoms: BTreeSet<String>,
    #[serde(default)]
    pub denied_symptoms: BTreeSet<String>,
    /// Ordered, duplicate-free list of canonicals already queried.
    #[serde(default)]
    pub asked_canonicals: Vec<String>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub parsed_answers: BTreeMap<String, ParsedAnswer>,
    #[serde(default)]
    pub asked_context_ids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_question: Option<QuestionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_envelope_type: Option<EnvelopeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    #[serde(default)]
    pub debug: DebugTrace,
}

impl Session {
    pub fn new(session_id: String, locale: String, now: NaiveDateTime) -> Self {
        Self {
            session_id,
            locale,
            turn_index: 0,
            created_at: now,
            updated_at: now,
            profile: Profile::default(),
            known_symptoms: BTreeSet::new(),
            denied_symptoms: BTreeSet::new(),
            asked_canonicals: Vec::new(),
            answers: BTreeMap::new(),
            parsed_answers: BTreeMap::new(),
            asked_context_ids: BTreeSet::new(),
            last_context_id: None,
            last_question: None,
            last_envelope_type: None,
            stop_reason: None,
            debug: DebugTrace::default(),
        }
    }

    /// Terminal once RESULT or EMERGENCY has been emitted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.last_envelope_type,
            Some(EnvelopeType::Result) | Some(EnvelopeType::Emergency)
        )
    }

    /// Record a queried canonical, preserving order and uniqueness.
    pub fn note_asked(&mut self, canonical: &str) {
        if !self.asked_canonicals.iter().any(|c| c == canonical) {
            self.asked_canonicals.push(canonical.to_string());
        }
    }

    pub fn was_asked(&self, canonical: &str) -> bool {
        self.asked_canonicals.iter().any(|c| c == canonical)
    }

    /// Confirm a symptom; a confirmation always clears an earlier denial.
    pub fn confirm_symptom(&mut self, canonical: &str) {
        self.denied_symptoms.remove(canonical);
        self.known_symptoms.insert(canonical.to_string());
    }

    /// Deny a symptom. When `retract_known` is set, an earlier confirmation
    /// is removed as well, keeping the two sets disjoint either way.
    pub fn deny_symptom(&mut self, canonical: &str, retract_known: bool) {
        if retract_known {
            self.known_symptoms.remove(canonical);
        }
        if !self.known_symptoms.contains(canonical) {
            self.denied_symptoms.insert(canonical.to_string());
        }
    }

    pub fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("s-1".into(), "tr-TR".into(), chrono::Utc::now().naive_utc())
    }

    #[test]
    fn known_and_denied_stay_disjoint() {
        let mut s = session();
        s.confirm_symptom("ateş");
        s.deny_symptom("ateş", true);
        assert!(!s.known_symptoms.contains("ateş"));
        assert!(s.denied_symptoms.contains("ateş"));

        s.confirm_symptom("ateş");
        assert!(s.known_symptoms.contains("ateş"));
        assert!(!s.denied_symptoms.contains("ateş"));
    }

    #[test]
    fn denial_without_retraction_keeps_confirmed_symptom() {
        let mut s = session();
        s.confirm_symptom("öksürük");
        s.deny_symptom("öksürük", false);
        assert!(s.known_symptoms.contains("öksürük"));
        assert!(!s.denied_symptoms.contains("öksürük"));
    }

    #[test]
    fn asked_canonicals_keep_order_without_duplicates() {
        let mut s = session();
        s.note_asked("bulantı");
        s.note_asked("ateş");
        s.note_asked("bulantı");
        assert_eq!(s.asked_canonicals, vec!["bulantı", "ateş"]);
        assert!(s.was_asked("ateş"));
        assert!(!s.was_asked("kusma"));
    }

    #[test]
    fn terminal_only_after_result_or_emergency() {
        let mut s = session();
        assert!(!s.is_terminal());
        s.last_envelope_type = Some(EnvelopeType::Question);
        assert!(!s.is_terminal());
        s.last_envelope_type = Some(EnvelopeType::Result);
        assert!(s.is_terminal());
        s.last_envelope_type = Some(EnvelopeType::Emergency);
        assert!(s.is_terminal());
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut s = session();
        s.confirm_symptom("baş ağrısı");
        s.deny_symptom("ateş", true);
        s.note_asked("bulantı");
        s.answers.insert("bulantı".into(), "Evet".into());
        s.parsed_answers.insert(
            "öksürük süresi".into(),
            ParsedAnswer {
                duration_days: Some(14),
                severity_0_10: None,
                timing: None,
            },
        );
        s.answers.insert("öksürük süresi".into(), "2 haftadır".into());

        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.known_symptoms, s.known_symptoms);
        assert_eq!(back.denied_symptoms, s.denied_symptoms);
        assert_eq!(back.asked_canonicals, s.asked_canonicals);
        assert_eq!(back.parsed_answers, s.parsed_answers);
        assert_eq!(back.turn_index, s.turn_index);
    }

    #[test]
    fn profile_merge_fills_provided_fields_only() {
        let mut p = Profile {
            age: Some(40),
            ..Profile::default()
        };
        let update = Profile {
            sex: Some("female".into()),
            ..Profile::default()
        };
        p.merge(&update);
        assert_eq!(p.age, Some(40));
        assert_eq!(p.sex.as_deref(), Some("female"));
        assert!(p.is_set(ProfileField::Age));
        assert!(p.is_set(ProfileField::Sex));
        assert!(!p.is_set(ProfileField::Pregnancy));
        assert!(!p.is_set(ProfileField::Chronic));
    }
}
