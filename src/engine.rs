//! Orchestrator: one call, one state transition.
//!
//! `handle_turn` loads (or creates) the session, ingests the answer and the
//! free text, runs both scoring layers and the merger, applies the safety
//! and stop policies, and either asks the next question or routes. Every
//! outcome — including every failure — is a single envelope; the session is
//! persisted only when an envelope is actually emitted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::messages::fill;
use crate::catalog::types::ContextQuestion;
use crate::catalog::{Catalog, CatalogError};
use crate::envelope::{
    EmergencyPayload, Envelope, EnvelopeBody, EnvelopeMeta, ErrorPayload, RecommendedSpecialty,
    ResultPayload, SameDayPayload, TopCondition,
};
use crate::facility::FacilityDirectory;
use crate::models::enums::{AnswerType, ErrorCode, StopReason, Urgency};
use crate::models::session::{DebugTrace, Profile, ProfileField, Session};
use crate::policy::{self, PolicyHit};
use crate::scoring::candidates::{generate_candidates, CandidateDisease};
use crate::scoring::confidence::compute as compute_confidence;
use crate::scoring::merge::{merge_decision, MergedSpecialty};
use crate::scoring::specialty::{score_specialties, SpecialtyScoring};
use crate::selector::{select_next_question, QuestionSource, Selection};
use crate::store::{SessionStore, StoreError};
use crate::text::interpret::interpret;
use crate::text::normalize::normalize;
use crate::text::parse::parse_free_text;

/// Answer to a previously emitted question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnAnswer {
    pub canonical: String,
    pub value: String,
}

/// One turn request, as handed over by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub locale: String,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub answer: Option<TurnAnswer>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

#[derive(Error, Debug)]
enum TurnError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown session: {0}")]
    BadSession(String),

    /// Carries the message-catalog key describing the state problem.
    #[error("bad state: {0}")]
    BadState(&'static str),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("internal: {0}")]
    Internal(String),
}

/// The pre-triage engine. Catalogs are shared immutably; sessions are
/// exclusively owned for the duration of a turn via per-session mutexes.
pub struct TriageEngine<S: SessionStore> {
    catalog: Arc<Catalog>,
    facilities: FacilityDirectory,
    store: S,
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: SessionStore> TriageEngine<S> {
    pub fn new(catalog: Arc<Catalog>, store: S) -> Self {
        let facilities = FacilityDirectory::new(catalog.facilities.clone());
        Self {
            catalog,
            facilities,
            store,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one turn; never panics, never returns anything but an envelope.
    pub fn handle_turn(&self, request: TurnRequest) -> Envelope {
        self.handle_turn_with_deadline(request, None)
    }

    /// Handle one turn with an optional deadline. On expiry the turn is
    /// abandoned without persisting, leaving the session at its last
    /// committed state.
    pub fn handle_turn_with_deadline(
        &self,
        request: TurnRequest,
        deadline: Option<Instant>,
    ) -> Envelope {
        let locale = request.locale.clone();
        let session_hint = request.session_id.clone().unwrap_or_default();
        match self.run_turn(request, deadline) {
            Ok(envelope) => envelope,
            Err(error) => self.error_envelope(&locale, session_hint, error),
        }
    }

    // ── Turn state machine ──────────────────────────────────

    fn run_turn(
        &self,
        request: TurnRequest,
        deadline: Option<Instant>,
    ) -> Result<Envelope, TurnError> {
        check_deadline(deadline)?;

        if request.user_message.trim().is_empty() && request.answer.is_none() {
            return Err(TurnError::EmptyInput);
        }
        // Surface locale problems before touching any state.
        self.catalog.messages_for(&request.locale)?;
        self.catalog.bank_for(&request.locale)?;
        let parser_sets = self.catalog.parser_sets_for(&request.locale)?;

        let now = chrono::Utc::now().naive_utc();

        // Load or create, under the per-session mutex.
        let session_id = match &request.session_id {
            Some(id) => id.clone(),
            None => self.store.create_id(),
        };
        let lock = self.session_lock(&session_id)?;
        let Ok(_guard) = lock.try_lock() else {
            return Err(TurnError::BadState("CONCURRENT_TURN"));
        };

        let mut session = match &request.session_id {
            Some(id) => {
                let session = self
                    .store
                    .load(id)?
                    .ok_or_else(|| TurnError::BadSession(id.clone()))?;
                if session.is_terminal() {
                    return Err(TurnError::BadState("SESSION_COMPLETE"));
                }
                session
            }
            None => Session::new(session_id.clone(), request.locale.clone(), now),
        };

        if let Some(profile) = &request.profile {
            session.profile.merge(profile);
        }

        if let Some(answer) = &request.answer {
            self.ingest_answer(&mut session, answer, &request.locale, parser_sets)?;
        }

        // Free text → canonical symptoms.
        let normalized = normalize(&request.user_message);
        let interpretation = interpret(&normalized, &self.catalog.synonym_index);
        for canonical in &interpretation.canonicals {
            if !session.denied_symptoms.contains(canonical) {
                session.known_symptoms.insert(canonical.clone());
            }
        }

        // Candidate and specialty pipelines.
        let candidates = generate_candidates(&self.catalog, &session.known_symptoms);
        let rules = score_specialties(&self.catalog, &normalized, &interpretation);
        let merged = merge_decision(&self.catalog, &candidates, &rules);
        session.debug = DebugTrace {
            candidates: candidates.clone(),
            specialty: Some(rules.clone()),
            merged: merged.clone(),
            selector_note: None,
        };

        // Safety first: emergencies short-circuit everything else.
        if let Some(hit) = policy::check_emergency(&self.catalog, &session) {
            return self.emit_emergency(&mut session, &request.locale, &hit, now, deadline);
        }
        let same_day = policy::check_same_day(&self.catalog, &session);

        // Stop policy and question selection.
        if policy::max_questions_reached(&self.catalog, &session, &merged, &candidates) {
            return self.emit_result(
                &mut session,
                &request,
                &candidates,
                &rules,
                &merged,
                same_day,
                StopReason::MaxQuestions,
                now,
                deadline,
            );
        }

        let selection =
            select_next_question(&self.catalog, &request.locale, &session, &candidates)?;
        let Some(selection) = selection else {
            return self.emit_result(
                &mut session,
                &request,
                &candidates,
                &rules,
                &merged,
                same_day,
                StopReason::NoQuestionAvailable,
                now,
                deadline,
            );
        };

        if selection.source == QuestionSource::Discriminative {
            let stop_rules = &self.catalog.stop_rules;
            let gain = selection.disc_score.unwrap_or(0.0);
            if gain < stop_rules.min_expected_gain {
                return self.emit_result(
                    &mut session,
                    &request,
                    &candidates,
                    &rules,
                    &merged,
                    same_day,
                    StopReason::MinExpectedGain,
                    now,
                    deadline,
                );
            }
            let confidence = compute_confidence(&candidates, &stop_rules.confidence);
            if stop_rules.stop_on_high_confidence
                && !candidates.is_empty()
                && confidence.confidence_0_1 >= stop_rules.confidence.high
            {
                return self.emit_result(
                    &mut session,
                    &request,
                    &candidates,
                    &rules,
                    &merged,
                    same_day,
                    StopReason::HighConfidence,
                    now,
                    deadline,
                );
            }
        }

        self.emit_question(&mut session, &request.locale, selection, same_day, now, deadline)
    }

    // ── Answer ingestion ────────────────────────────────────

    fn ingest_answer(
        &self,
        session: &mut Session,
        answer: &TurnAnswer,
        locale: &str,
        parser_sets: &crate::catalog::types::ParserSets,
    ) -> Result<(), TurnError> {
        let canonical = answer.canonical.as_str();

        if session.last_context_id.as_deref() == Some(canonical) {
            let question = self
                .catalog
                .context_questions
                .iter()
                .find(|q| q.id == canonical);
            if let Some(question) = question {
                ingest_context_answer(question, &answer.value, &mut session.profile);
            }
            session.asked_context_ids.insert(canonical.to_string());
            session.last_context_id = None;
            return Ok(());
        }

        if !session.was_asked(canonical) {
            return Err(TurnError::BadState("UNKNOWN_ANSWER"));
        }

        let answer_type = session
            .last_question
            .as_ref()
            .filter(|q| q.canonical == canonical)
            .map(|q| q.answer_type)
            .or_else(|| {
                self.catalog
                    .bank_entry(locale, canonical)
                    .ok()
                    .flatten()
                    .map(|entry| entry.answer_type)
            })
            .unwrap_or(AnswerType::YesNo);

        if answer_type == AnswerType::YesNo {
            match parse_yes_no(&normalize(&answer.value)) {
                Some(true) => session.confirm_symptom(canonical),
                Some(false) => {
                    session.deny_symptom(canonical, self.catalog.stop_rules.retract_on_denial)
                }
                None => {}
            }
        }

        session.answers.insert(canonical.to_string(), answer.value.clone());
        let parsed = parse_free_text(canonical, &answer.value, parser_sets);
        if !parsed.is_empty() {
            session.parsed_answers.insert(canonical.to_string(), parsed);
        }
        session.note_asked(canonical);
        Ok(())
    }

    // ── Envelope emission ───────────────────────────────────

    fn emit(
        &self,
        session: &mut Session,
        body: EnvelopeBody,
        meta: Option<EnvelopeMeta>,
        now: chrono::NaiveDateTime,
        deadline: Option<Instant>,
    ) -> Result<Envelope, TurnError> {
        check_deadline(deadline)?;
        session.turn_index += 1;
        session.last_envelope_type = Some(body.envelope_type());
        session.touch(now);

        let envelope = Envelope {
            session_id: session.session_id.clone(),
            turn_index: session.turn_index,
            body,
            meta,
        };
        self.store.save(session)?;
        let payload = serde_json::to_value(&envelope)
            .map_err(|e| TurnError::Internal(e.to_string()))?;
        self.store.append_event(
            &session.session_id,
            session.turn_index,
            envelope.envelope_type(),
            &payload,
        )?;
        Ok(envelope)
    }

    fn emit_emergency(
        &self,
        session: &mut Session,
        locale: &str,
        hit: &PolicyHit,
        now: chrono::NaiveDateTime,
        deadline: Option<Instant>,
    ) -> Result<Envelope, TurnError> {
        let messages = self.catalog.messages_for(locale)?;
        session.stop_reason = Some(StopReason::Emergency);
        let body = EnvelopeBody::Emergency(EmergencyPayload {
            urgency: Urgency::Emergency,
            reason_tr: self.catalog.msg(locale, &hit.message_key),
            instructions_tr: messages.emergency_instructions.clone(),
        });
        let meta = self.meta(locale, None, None);
        self.emit(session, body, Some(meta), now, deadline)
    }

    fn emit_question(
        &self,
        session: &mut Session,
        locale: &str,
        selection: Selection,
        same_day: Option<PolicyHit>,
        now: chrono::NaiveDateTime,
        deadline: Option<Instant>,
    ) -> Result<Envelope, TurnError> {
        match selection.source {
            QuestionSource::Context => {
                // Consumed at emission so an ignored question is skipped,
                // never repeated.
                let id = selection
                    .context_id
                    .clone()
                    .unwrap_or_else(|| selection.payload.canonical.clone());
                session.asked_context_ids.insert(id.clone());
                session.last_context_id = Some(id);
            }
            QuestionSource::RedFlag | QuestionSource::Discriminative => {
                session.note_asked(&selection.payload.canonical);
                session.last_context_id = None;
            }
        }
        session.last_question = Some(selection.payload.clone());
        session.debug.selector_note = Some(format!(
            "{:?}:{}",
            selection.source, selection.payload.canonical
        ));

        let meta = self.meta(locale, same_day.as_ref(), None);
        let body = EnvelopeBody::Question(selection.payload);
        self.emit(session, body, Some(meta), now, deadline)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_result(
        &self,
        session: &mut Session,
        request: &TurnRequest,
        candidates: &[CandidateDisease],
        rules: &SpecialtyScoring,
        merged: &[MergedSpecialty],
        same_day: Option<PolicyHit>,
        stop_reason: StopReason,
        now: chrono::NaiveDateTime,
        deadline: Option<Instant>,
    ) -> Result<Envelope, TurnError> {
        let locale = request.locale.as_str();
        let messages = self.catalog.messages_for(locale)?;

        let specialty_id = merged
            .first()
            .map(|m| m.specialty_id.clone())
            .unwrap_or_else(|| self.catalog.stop_rules.default_specialty_id.clone());
        let urgency = policy::derive_urgency(&self.catalog, &specialty_id, same_day.is_some());

        let confidence =
            compute_confidence(candidates, &self.catalog.stop_rules.confidence);

        let top_conditions = candidates
            .iter()
            .map(|c| TopCondition {
                disease_label: c.disease_label.clone(),
                score_0_1: c.score_0_1,
            })
            .collect();

        let facilities = match (request.lat, request.lon) {
            (Some(lat), Some(lon)) => {
                let hits = self.facilities.lookup(&specialty_id, None, Some(lat), Some(lon), 3);
                (!hits.is_empty()).then_some(hits)
            }
            _ => None,
        };

        session.stop_reason = Some(stop_reason);
        let payload = ResultPayload {
            urgency,
            recommended_specialty: RecommendedSpecialty {
                id: specialty_id.clone(),
                name_tr: self.catalog.specialty_name_tr(&specialty_id),
            },
            top_conditions,
            doctor_ready_summary_tr: self.build_summary(session, locale, urgency),
            safety_notes_tr: messages.safety_notes.clone(),
            confidence_0_1: confidence.confidence_0_1,
            confidence_label_tr: self.catalog.msg(locale, confidence.label_key),
            confidence_explain_tr: self.catalog.msg(locale, confidence.explain_key),
            why_specialty_tr: self.build_why_lines(locale, &specialty_id, rules, merged),
            stop_reason,
        };

        let meta = self.meta(locale, same_day.as_ref(), facilities);
        self.emit(session, EnvelopeBody::Result(payload), Some(meta), now, deadline)
    }

    // ── Envelope pieces ─────────────────────────────────────

    fn meta(
        &self,
        locale: &str,
        same_day: Option<&PolicyHit>,
        facilities: Option<Vec<crate::facility::FacilityHit>>,
    ) -> EnvelopeMeta {
        EnvelopeMeta {
            disclaimer_tr: self.catalog.msg(locale, "disclaimer"),
            same_day: same_day.map(|hit| SameDayPayload {
                message_tr: self.catalog.msg(locale, &hit.message_key),
            }),
            facilities,
        }
    }

    /// Explainability lines for the winning specialty, from the scorer and
    /// merger traces.
    fn build_why_lines(
        &self,
        locale: &str,
        specialty_id: &str,
        rules: &SpecialtyScoring,
        merged: &[MergedSpecialty],
    ) -> Vec<String> {
        let catalog = &self.catalog;
        let name = catalog.specialty_name_tr(specialty_id);
        let scoring = &catalog.scoring;
        let mut lines = Vec::new();

        if let Some(score) = rules.score_for(specialty_id) {
            for hit in &score.phrase_hits {
                lines.push(fill(
                    &catalog.msg(locale, "why_phrase"),
                    &[
                        ("phrase", hit.phrase.clone()),
                        ("specialty", name.clone()),
                        ("points", scoring.phrase_match_points.to_string()),
                    ],
                ));
            }
            for keyword in &score.keyword_hits {
                lines.push(fill(
                    &catalog.msg(locale, "why_keyword"),
                    &[
                        ("keyword", keyword.clone()),
                        ("specialty", name.clone()),
                        ("points", scoring.keyword_match_points.to_string()),
                    ],
                ));
            }
            for negative in &score.negative_hits {
                lines.push(fill(
                    &catalog.msg(locale, "why_negative"),
                    &[
                        ("keyword", negative.clone()),
                        ("specialty", name.clone()),
                        ("points", scoring.negative_keyword_penalty.to_string()),
                    ],
                ));
            }
        }
        if let Some(entry) = merged.iter().find(|m| m.specialty_id == specialty_id) {
            if entry.prior_score > 0.0 {
                lines.push(fill(
                    &catalog.msg(locale, "why_prior"),
                    &[
                        ("specialty", name.clone()),
                        ("points", format!("{:.1}", entry.prior_score)),
                    ],
                ));
            }
        }
        lines
    }

    /// Doctor-ready summary: symptoms, parsed durations/severities/timing,
    /// question-answer highlights, risk level — in that order.
    fn build_summary(&self, session: &Session, locale: &str, urgency: Urgency) -> Vec<String> {
        let catalog = &self.catalog;
        let mut lines = Vec::new();

        let known: Vec<String> = session.known_symptoms.iter().cloned().collect();
        lines.push(format!(
            "{}: {}",
            catalog.msg(locale, "summary_symptoms"),
            if known.is_empty() { "-".to_string() } else { known.join(", ") }
        ));
        if !session.denied_symptoms.is_empty() {
            let denied: Vec<String> = session.denied_symptoms.iter().cloned().collect();
            lines.push(format!(
                "{}: {}",
                catalog.msg(locale, "summary_denied"),
                denied.join(", ")
            ));
        }

        for (canonical, parsed) in &session.parsed_answers {
            if let Some(days) = parsed.duration_days {
                lines.push(format!(
                    "{} ({canonical}): {days} gün",
                    catalog.msg(locale, "summary_duration")
                ));
            }
            if let Some(severity) = parsed.severity_0_10 {
                lines.push(format!(
                    "{} ({canonical}): {severity}/10",
                    catalog.msg(locale, "summary_severity")
                ));
            }
            if let Some(timing) = parsed.timing {
                lines.push(format!(
                    "{} ({canonical}): {}",
                    catalog.msg(locale, "summary_timing"),
                    timing.label_tr()
                ));
            }
        }

        let qa: Vec<String> = session
            .asked_canonicals
            .iter()
            .filter_map(|c| session.answers.get(c).map(|a| format!("{c}: {a}")))
            .collect();
        if !qa.is_empty() {
            lines.push(format!(
                "{}: {}",
                catalog.msg(locale, "summary_qa"),
                qa.join("; ")
            ));
        }

        lines.push(format!(
            "{}: {}",
            catalog.msg(locale, "summary_risk"),
            catalog.msg(locale, &format!("urgency_{}", urgency.as_str()))
        ));
        lines
    }

    // ── Errors and locking ──────────────────────────────────

    fn session_lock(&self, session_id: &str) -> Result<Arc<Mutex<()>>, TurnError> {
        let mut locks = self
            .session_locks
            .lock()
            .map_err(|_| TurnError::Internal("session lock registry poisoned".into()))?;
        Ok(locks
            .entry(session_id.to_string())
            .or_default()
            .clone())
    }

    fn error_envelope(&self, locale: &str, session_id: String, error: TurnError) -> Envelope {
        let (code, message_key) = match &error {
            TurnError::EmptyInput => (ErrorCode::EmptyInput, "EMPTY_INPUT"),
            TurnError::BadSession(_) => (ErrorCode::BadSession, "BAD_SESSION"),
            TurnError::BadState(key) => (ErrorCode::BadState, *key),
            TurnError::Catalog(_) => (ErrorCode::CatalogError, "CATALOG_ERROR"),
            TurnError::Store(_) | TurnError::DeadlineExceeded | TurnError::Internal(_) => {
                (ErrorCode::Internal, "TURN_FAILED")
            }
        };
        match code {
            ErrorCode::Internal => {
                tracing::error!(error = %error, "Turn failed");
            }
            _ => tracing::warn!(error = %error, "Turn rejected"),
        }

        Envelope {
            session_id,
            turn_index: 0,
            body: EnvelopeBody::Error(ErrorPayload {
                code,
                message_tr: self.catalog.msg(locale, message_key),
                retryable: code.retryable(),
            }),
            meta: None,
        }
    }
}

// ── Free helpers ────────────────────────────────────────────

fn check_deadline(deadline: Option<Instant>) -> Result<(), TurnError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(TurnError::DeadlineExceeded),
        _ => Ok(()),
    }
}

fn parse_yes_no(normalized: &str) -> Option<bool> {
    let tokens: Vec<&str> = normalized.split(' ').collect();
    const NO_WORDS: &[&str] = &["hayır", "yok", "no", "olmadı"];
    const YES_WORDS: &[&str] = &["evet", "var", "yes", "oldu"];
    if tokens.iter().any(|t| NO_WORDS.contains(t)) {
        return Some(false);
    }
    if tokens.iter().any(|t| YES_WORDS.contains(t)) {
        return Some(true);
    }
    None
}

fn ingest_context_answer(question: &ContextQuestion, value: &str, profile: &mut Profile) {
    let normalized = normalize(value);
    match question.profile_field {
        ProfileField::Age => {
            profile.age = normalized
                .split(' ')
                .find_map(|t| t.parse::<u32>().ok())
                .filter(|age| *age <= 120);
        }
        ProfileField::Sex => {
            let tokens: Vec<&str> = normalized.split(' ').collect();
            profile.sex = if tokens.iter().any(|t| ["kadın", "female", "woman"].contains(t)) {
                Some("female".into())
            } else if tokens.iter().any(|t| ["erkek", "male", "man"].contains(t)) {
                Some("male".into())
            } else if normalized.is_empty() {
                None
            } else {
                Some(normalized.clone())
            };
        }
        ProfileField::Pregnancy => {
            profile.pregnant = parse_yes_no(&normalized);
        }
        ProfileField::Chronic => {
            const NONE_WORDS: &[&str] = &["yok", "hayır", "none", "no"];
            for item in normalized.split(',') {
                let item = item.trim();
                if !item.is_empty() && !NONE_WORDS.contains(&item) {
                    profile.chronic.insert(item.to_string());
                }
            }
        }
    }
}
