use serde::{Deserialize, Serialize};

/// How a bank question expects to be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    YesNo,
    FreeText,
    Number,
    MultiChoice,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YesNo => "yes_no",
            Self::FreeText => "free_text",
            Self::Number => "number",
            Self::MultiChoice => "multi_choice",
        }
    }
}

/// Time-of-day classification extracted from free-text answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    Morning,
    Evening,
    Night,
    Day,
}

impl Timing {
    /// Turkish display label used in the doctor-ready summary.
    pub fn label_tr(&self) -> &'static str {
        match self {
            Self::Morning => "sabah",
            Self::Evening => "akşam",
            Self::Night => "gece",
            Self::Day => "gündüz",
        }
    }
}

/// Routing urgency attached to RESULT and EMERGENCY envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "EMERGENCY")]
    Emergency,
    #[serde(rename = "ER_NOW")]
    ErNow,
    #[serde(rename = "SAME_DAY")]
    SameDay,
    #[serde(rename = "WITHIN_3_DAYS")]
    Within3Days,
    #[serde(rename = "ROUTINE")]
    Routine,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::ErNow => "ER_NOW",
            Self::SameDay => "SAME_DAY",
            Self::Within3Days => "WITHIN_3_DAYS",
            Self::Routine => "ROUTINE",
        }
    }
}

/// Machine-readable cause for terminating the question loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxQuestions,
    MinExpectedGain,
    NoQuestionAvailable,
    HighConfidence,
    Emergency,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxQuestions => "max_questions",
            Self::MinExpectedGain => "min_expected_gain",
            Self::NoQuestionAvailable => "no_question_available",
            Self::HighConfidence => "high_confidence",
            Self::Emergency => "emergency",
        }
    }
}

/// Error codes surfaced in ERROR envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "EMPTY_INPUT")]
    EmptyInput,
    #[serde(rename = "BAD_SESSION")]
    BadSession,
    #[serde(rename = "BAD_STATE")]
    BadState,
    #[serde(rename = "CATALOG_ERROR")]
    CatalogError,
    #[serde(rename = "INTERNAL")]
    Internal,
}

impl ErrorCode {
    pub fn retryable(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_type_round_trips_snake_case() {
        let json = serde_json::to_string(&AnswerType::YesNo).unwrap();
        assert_eq!(json, "\"yes_no\"");
        let back: AnswerType = serde_json::from_str("\"multi_choice\"").unwrap();
        assert_eq!(back, AnswerType::MultiChoice);
    }

    #[test]
    fn urgency_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Urgency::ErNow).unwrap(), "\"ER_NOW\"");
        assert_eq!(
            serde_json::to_string(&Urgency::Within3Days).unwrap(),
            "\"WITHIN_3_DAYS\""
        );
    }

    #[test]
    fn stop_reason_as_str_matches_serde() {
        for reason in [
            StopReason::MaxQuestions,
            StopReason::MinExpectedGain,
            StopReason::NoQuestionAvailable,
            StopReason::HighConfidence,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
    }

    #[test]
    fn only_empty_input_and_internal_are_retryable() {
        assert!(ErrorCode::EmptyInput.retryable());
        assert!(ErrorCode::Internal.retryable());
        assert!(!ErrorCode::BadSession.retryable());
        assert!(!ErrorCode::BadState.retryable());
        assert!(!ErrorCode::CatalogError.retryable());
    }
}
