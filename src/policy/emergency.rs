//! Emergency and same-day rule evaluation.
//!
//! Rules are pure predicates over the session's symptom state: an `all_of`
//! set, an optional `any_of` set, and optional minimum severity/duration
//! conditions read from parsed answers. First match wins, in catalog order.

use crate::catalog::types::SymptomRule;
use crate::catalog::Catalog;
use crate::models::session::Session;

/// A fired policy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyHit {
    pub rule_id: String,
    pub message_key: String,
}

/// A parsed-answer canonical relates to a rule canonical when it is the
/// canonical itself or a follow-up of it ("öksürük süresi" → "öksürük").
fn related(parsed_canonical: &str, rule_canonical: &str) -> bool {
    parsed_canonical == rule_canonical
        || (parsed_canonical.starts_with(rule_canonical)
            && parsed_canonical[rule_canonical.len()..].starts_with(' '))
}

fn rule_matches(rule: &SymptomRule, session: &Session) -> bool {
    if !rule
        .all_of
        .iter()
        .all(|s| session.known_symptoms.contains(s))
    {
        return false;
    }
    if !rule.any_of.is_empty()
        && !rule
            .any_of
            .iter()
            .any(|s| session.known_symptoms.contains(s))
    {
        return false;
    }

    let rule_canonicals = || rule.all_of.iter().chain(&rule.any_of);

    if let Some(min_severity) = rule.min_severity {
        let satisfied = session.parsed_answers.iter().any(|(canonical, parsed)| {
            parsed.severity_0_10.is_some_and(|s| s >= min_severity)
                && rule_canonicals().any(|r| related(canonical, r))
        });
        if !satisfied {
            return false;
        }
    }
    if let Some(min_duration) = rule.min_duration_days {
        let satisfied = session.parsed_answers.iter().any(|(canonical, parsed)| {
            parsed.duration_days.is_some_and(|d| d >= min_duration)
                && rule_canonicals().any(|r| related(canonical, r))
        });
        if !satisfied {
            return false;
        }
    }
    true
}

fn first_match<'a>(rules: &'a [SymptomRule], session: &Session) -> Option<&'a SymptomRule> {
    rules.iter().find(|rule| rule_matches(rule, session))
}

/// Check the emergency rules; a hit short-circuits the whole turn.
pub fn check_emergency(catalog: &Catalog, session: &Session) -> Option<PolicyHit> {
    let rule = first_match(&catalog.emergency_rules, session)?;
    tracing::warn!(
        session_id = %session.session_id,
        rule_id = %rule.id,
        "Emergency rule fired"
    );
    Some(PolicyHit {
        rule_id: rule.id.clone(),
        message_key: rule.message_key.clone(),
    })
}

/// Check the same-day rules; a hit decorates the next envelope.
pub fn check_same_day(catalog: &Catalog, session: &Session) -> Option<PolicyHit> {
    let rule = first_match(&catalog.same_day_rules, session)?;
    Some(PolicyHit {
        rule_id: rule.id.clone(),
        message_key: rule.message_key.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::ParsedAnswer;

    fn session_with_known(known: &[&str]) -> Session {
        let mut session = Session::new(
            "s-1".into(),
            "tr-TR".into(),
            chrono::Utc::now().naive_utc(),
        );
        session.known_symptoms = known.iter().map(|s| s.to_string()).collect();
        session
    }

    // ── Emergency ───────────────────────────────────────────

    #[test]
    fn chest_pain_with_companion_fires_acs() {
        let catalog = Catalog::load_test();
        let session = session_with_known(&["göğüs ağrısı", "terleme", "nefes darlığı"]);
        let hit = check_emergency(&catalog, &session).unwrap();
        assert_eq!(hit.rule_id, "em_acs");
        assert_eq!(hit.message_key, "emergency_acs");
    }

    #[test]
    fn chest_pain_alone_does_not_fire_acs() {
        let catalog = Catalog::load_test();
        let session = session_with_known(&["göğüs ağrısı"]);
        assert!(check_emergency(&catalog, &session).is_none());
    }

    #[test]
    fn severity_condition_gates_breathlessness_rule() {
        let catalog = Catalog::load_test();
        let mut session = session_with_known(&["nefes darlığı"]);
        assert!(check_emergency(&catalog, &session).is_none());

        session.parsed_answers.insert(
            "nefes darlığı".into(),
            ParsedAnswer { severity_0_10: Some(9), ..ParsedAnswer::default() },
        );
        let hit = check_emergency(&catalog, &session).unwrap();
        assert_eq!(hit.rule_id, "em_breathless");
    }

    #[test]
    fn severity_below_threshold_does_not_fire() {
        let catalog = Catalog::load_test();
        let mut session = session_with_known(&["nefes darlığı"]);
        session.parsed_answers.insert(
            "nefes darlığı".into(),
            ParsedAnswer { severity_0_10: Some(5), ..ParsedAnswer::default() },
        );
        assert!(check_emergency(&catalog, &session).is_none());
    }

    #[test]
    fn duration_condition_reads_follow_up_canonical() {
        let catalog = Catalog::load_test();
        let mut session = session_with_known(&["ateş"]);
        // "ateş süresi" is a follow-up of "ateş".
        session.parsed_answers.insert(
            "ateş süresi".into(),
            ParsedAnswer { duration_days: Some(14), ..ParsedAnswer::default() },
        );
        let hit = check_emergency(&catalog, &session).unwrap();
        assert_eq!(hit.rule_id, "em_fever_long");
    }

    #[test]
    fn unrelated_duration_does_not_satisfy_rule() {
        let catalog = Catalog::load_test();
        let mut session = session_with_known(&["ateş"]);
        session.parsed_answers.insert(
            "öksürük süresi".into(),
            ParsedAnswer { duration_days: Some(30), ..ParsedAnswer::default() },
        );
        assert!(check_emergency(&catalog, &session).is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        let catalog = Catalog::load_test();
        let mut session = session_with_known(&["göğüs ağrısı", "nefes darlığı"]);
        session.parsed_answers.insert(
            "nefes darlığı".into(),
            ParsedAnswer { severity_0_10: Some(10), ..ParsedAnswer::default() },
        );
        // Both em_acs and em_breathless match; catalog order decides.
        let hit = check_emergency(&catalog, &session).unwrap();
        assert_eq!(hit.rule_id, "em_acs");
    }

    // ── Same-day ────────────────────────────────────────────

    #[test]
    fn uti_with_fever_is_same_day() {
        let catalog = Catalog::load_test();
        let session = session_with_known(&["idrarda yanma", "ateş"]);
        let hit = check_same_day(&catalog, &session).unwrap();
        assert_eq!(hit.rule_id, "sd_uti_fever");
    }

    #[test]
    fn fever_needs_three_days_for_same_day() {
        let catalog = Catalog::load_test();
        let mut session = session_with_known(&["ateş"]);
        assert!(check_same_day(&catalog, &session).is_none());

        session.parsed_answers.insert(
            "ateş süresi".into(),
            ParsedAnswer { duration_days: Some(4), ..ParsedAnswer::default() },
        );
        let hit = check_same_day(&catalog, &session).unwrap();
        assert_eq!(hit.rule_id, "sd_fever_3d");
    }

    #[test]
    fn no_rules_fire_on_calm_state() {
        let catalog = Catalog::load_test();
        let session = session_with_known(&["bulantı"]);
        assert!(check_emergency(&catalog, &session).is_none());
        assert!(check_same_day(&catalog, &session).is_none());
    }
}
