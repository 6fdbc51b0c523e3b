//! Serde shapes of the catalog files.
//!
//! Catalogs are immutable at runtime: loaded once at startup, shared across
//! sessions. Every tunable threshold of the engine lives here rather than in
//! code.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::enums::{AnswerType, Timing, Urgency};
use crate::models::session::ProfileField;

// ── Synonyms ────────────────────────────────────────────────

/// One canonical symptom with its surface variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub canonical: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub variants: Vec<String>,
}

// ── Specialty keywords ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyEntry {
    pub id: String,
    pub name_tr: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub negative_keywords: Vec<String>,
}

fn default_keyword_points() -> i32 {
    3
}
fn default_phrase_points() -> i32 {
    5
}
fn default_negative_penalty() -> i32 {
    -4
}
fn default_tie_breakers() -> Vec<String> {
    vec!["score".into(), "keyword_score".into(), "specialty_id".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_keyword_points")]
    pub keyword_match_points: i32,
    #[serde(default = "default_phrase_points")]
    pub phrase_match_points: i32,
    #[serde(default = "default_negative_penalty")]
    pub negative_keyword_penalty: i32,
    #[serde(default = "default_tie_breakers")]
    pub tie_breakers: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            keyword_match_points: default_keyword_points(),
            phrase_match_points: default_phrase_points(),
            negative_keyword_penalty: default_negative_penalty(),
            tie_breakers: default_tie_breakers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyFile {
    pub specialties: Vec<SpecialtyEntry>,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

// ── Disease mappings ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseSpecialty {
    pub id: String,
    pub confidence: f64,
}

// ── Question bank ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBankEntry {
    pub canonical: String,
    pub question: String,
    pub answer_type: AnswerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority_when_known: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_asking: Option<String>,
}

/// Forbids asking `canonical_symptom` once any listed canonical was denied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipRule {
    pub canonical_symptom: String,
    pub skip_if_denied: Vec<String>,
}

// ── Context questions ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhenAsk {
    Always,
    WhenSymptomsAny,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextQuestion {
    pub id: String,
    /// Locale → question text.
    pub question: BTreeMap<String, String>,
    pub answer_type: AnswerType,
    pub profile_field: ProfileField,
    pub when_ask: WhenAsk,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub when_symptoms_any: Vec<String>,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    pub questions: Vec<ContextQuestion>,
    /// Canonicals that make the pregnancy question relevant.
    #[serde(default)]
    pub pregnancy_relevant: Vec<String>,
}

// ── Red-flag questions ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedFlagQuestion {
    pub id: String,
    pub canonical: String,
    /// All listed canonicals must be known for the question to fire.
    pub preconditions: Vec<String>,
    /// Locale → question text.
    pub question: BTreeMap<String, String>,
    /// Locale → why-asking text.
    #[serde(default)]
    pub reason: BTreeMap<String, String>,
}

// ── Policy rules ────────────────────────────────────────────

/// Pure predicate over the session's symptom state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRule {
    pub id: String,
    pub all_of: Vec<String>,
    #[serde(default)]
    pub any_of: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration_days: Option<u32>,
    /// Message-catalog key for the reason / banner text.
    pub message_key: String,
}

fn default_confidence_high() -> f64 {
    0.70
}
fn default_confidence_medium() -> f64 {
    0.45
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    #[serde(default = "default_confidence_high")]
    pub high: f64,
    #[serde(default = "default_confidence_medium")]
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: default_confidence_high(),
            medium: default_confidence_medium(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRules {
    pub max_questions: u32,
    pub max_questions_emergency: u32,
    #[serde(default)]
    pub emergency_specialty_ids: Vec<String>,
    #[serde(default)]
    pub emergency_disease_keywords: Vec<String>,
    /// Discriminative-score floor below which asking is not worth a turn.
    pub min_expected_gain: f64,
    #[serde(default)]
    pub stop_on_high_confidence: bool,
    #[serde(default)]
    pub confidence: ConfidenceThresholds,
    pub default_specialty_id: String,
    /// Whether a denial retracts an earlier confirmation of the same
    /// canonical.
    #[serde(default)]
    pub retract_on_denial: bool,
}

fn default_top_k() -> usize {
    5
}
fn default_min_score() -> f64 {
    0.05
}
fn default_symptom_weight() -> f64 {
    1.0
}
fn default_severity_multiplier() -> f64 {
    0.25
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateGeneratorConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score_to_include: f64,
    #[serde(default = "default_symptom_weight")]
    pub default_symptom_weight: f64,
    #[serde(default = "default_severity_multiplier")]
    pub severity_weight_multiplier: f64,
}

impl Default for CandidateGeneratorConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score_to_include: default_min_score(),
            default_symptom_weight: default_symptom_weight(),
            severity_weight_multiplier: default_severity_multiplier(),
        }
    }
}

// ── Free-text parser configuration ──────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationUnit {
    /// Unit word prefix; suffixed forms ("gündür", "haftadır") match too.
    pub prefix: String,
    pub days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSets {
    #[serde(default)]
    pub duration_canonicals: BTreeSet<String>,
    #[serde(default)]
    pub severity_canonicals: BTreeSet<String>,
    #[serde(default)]
    pub timing_canonicals: BTreeSet<String>,
    pub duration_units: Vec<DurationUnit>,
    #[serde(default)]
    pub severity_words: BTreeMap<String, u8>,
    #[serde(default)]
    pub timing_words: BTreeMap<String, Timing>,
}

// ── Facilities ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub specialty_ids: Vec<String>,
    pub city: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

// ── Messages ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleMessages {
    #[serde(default)]
    pub text: BTreeMap<String, String>,
    #[serde(default)]
    pub emergency_instructions: Vec<String>,
    #[serde(default)]
    pub safety_notes: Vec<String>,
}

/// Specialty id → default urgency for non-emergency routing.
pub type SpecialtyUrgency = BTreeMap<String, Urgency>;
