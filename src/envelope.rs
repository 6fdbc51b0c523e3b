//! The discriminated envelope returned by every turn.
//!
//! Exactly one envelope per call, discriminated by `envelope_type`. The
//! payload shapes are part of the external contract and serialize to the
//! wire field names (`question_tr`, `reason_tr`, ...) verbatim.

use serde::{Deserialize, Serialize};

use crate::facility::FacilityHit;
use crate::models::enums::{AnswerType, ErrorCode, StopReason, Urgency};

/// Envelope discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeType {
    #[serde(rename = "QUESTION")]
    Question,
    #[serde(rename = "RESULT")]
    Result,
    #[serde(rename = "EMERGENCY")]
    Emergency,
    #[serde(rename = "SAME_DAY")]
    SameDay,
    #[serde(rename = "ERROR")]
    Error,
}

impl EnvelopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "QUESTION",
            Self::Result => "RESULT",
            Self::Emergency => "EMERGENCY",
            Self::SameDay => "SAME_DAY",
            Self::Error => "ERROR",
        }
    }

    /// RESULT and EMERGENCY close the session for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result | Self::Emergency)
    }
}

impl std::str::FromStr for EnvelopeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUESTION" => Ok(Self::Question),
            "RESULT" => Ok(Self::Result),
            "EMERGENCY" => Ok(Self::Emergency),
            "SAME_DAY" => Ok(Self::SameDay),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown envelope type: {other}")),
        }
    }
}

/// Discriminated envelope body. Serializes as
/// `{"envelope_type": "...", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "envelope_type", content = "payload")]
pub enum EnvelopeBody {
    #[serde(rename = "QUESTION")]
    Question(QuestionPayload),
    #[serde(rename = "RESULT")]
    Result(ResultPayload),
    #[serde(rename = "EMERGENCY")]
    Emergency(EmergencyPayload),
    #[serde(rename = "SAME_DAY")]
    SameDay(SameDayPayload),
    #[serde(rename = "ERROR")]
    Error(ErrorPayload),
}

impl EnvelopeBody {
    pub fn envelope_type(&self) -> EnvelopeType {
        match self {
            Self::Question(_) => EnvelopeType::Question,
            Self::Result(_) => EnvelopeType::Result,
            Self::Emergency(_) => EnvelopeType::Emergency,
            Self::SameDay(_) => EnvelopeType::SameDay,
            Self::Error(_) => EnvelopeType::Error,
        }
    }
}

/// One turn's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub session_id: String,
    pub turn_index: u32,
    #[serde(flatten)]
    pub body: EnvelopeBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EnvelopeMeta>,
}

impl Envelope {
    pub fn envelope_type(&self) -> EnvelopeType {
        self.body.envelope_type()
    }

    pub fn is_terminal(&self) -> bool {
        self.envelope_type().is_terminal()
    }
}

/// Shared envelope decoration: disclaimer, optional same-day banner,
/// optional facility hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub disclaimer_tr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_day: Option<SameDayPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<FacilityHit>>,
}

// ── Payloads ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question_id: String,
    pub canonical: String,
    pub question_tr: String,
    pub answer_type: AnswerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices_tr: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_asking_tr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedSpecialty {
    pub id: String,
    pub name_tr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCondition {
    pub disease_label: String,
    pub score_0_1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPayload {
    pub urgency: Urgency,
    pub recommended_specialty: RecommendedSpecialty,
    pub top_conditions: Vec<TopCondition>,
    pub doctor_ready_summary_tr: Vec<String>,
    pub safety_notes_tr: Vec<String>,
    pub confidence_0_1: f64,
    pub confidence_label_tr: String,
    pub confidence_explain_tr: String,
    pub why_specialty_tr: Vec<String>,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyPayload {
    pub urgency: Urgency,
    pub reason_tr: String,
    pub instructions_tr: Vec<String>,
}

/// Soft-urgency banner riding along non-emergency envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SameDayPayload {
    pub message_tr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message_tr: String,
    pub retryable: bool,
}
