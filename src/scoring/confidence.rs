//! Routing confidence from the Layer A ranking.
//!
//! `top1·0.75 + gap·0.6`, clamped to [0, 1]. The label thresholds come from
//! the catalog; the weights are part of the formula itself.

use serde::{Deserialize, Serialize};

use crate::catalog::types::ConfidenceThresholds;
use crate::scoring::candidates::CandidateDisease;

const TOP1_WEIGHT: f64 = 0.75;
const GAP_WEIGHT: f64 = 0.6;

/// Confidence with message-catalog keys for label and explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confidence {
    pub confidence_0_1: f64,
    pub label_key: &'static str,
    pub explain_key: &'static str,
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Compute confidence over the ranked candidates (0 when empty).
pub fn compute(candidates: &[CandidateDisease], thresholds: &ConfidenceThresholds) -> Confidence {
    let top1 = candidates.first().map(|c| c.score_0_1).unwrap_or(0.0);
    let top2 = candidates.get(1).map(|c| c.score_0_1).unwrap_or(0.0);
    let gap = (top1 - top2).max(0.0);
    let confidence = clamp01(top1 * TOP1_WEIGHT + gap * GAP_WEIGHT);

    let (label_key, explain_key) = if confidence >= thresholds.high {
        ("confidence_label_high", "confidence_explain_high")
    } else if confidence >= thresholds.medium {
        ("confidence_label_medium", "confidence_explain_medium")
    } else {
        ("confidence_label_low", "confidence_explain_low")
    };

    Confidence { confidence_0_1: confidence, label_key, explain_key }
}
