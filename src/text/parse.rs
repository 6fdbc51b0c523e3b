//! Free-text answer parsing: duration, severity, timing.
//!
//! Three sub-parsers, each idempotent and side-effect free. Which of them
//! runs for a given answer is decided by the catalog's canonical sets, so a
//! duration answer is never mistaken for a severity rating. Unparsable input
//! yields an empty struct, never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::types::ParserSets;
use crate::models::enums::Timing;
use crate::models::session::ParsedAnswer;
use crate::text::normalize::normalize;

/// `<int>` followed by a word, e.g. "3 gündür", "2 hafta".
static COUNT_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,4})\s*(\p{L}+)").expect("invalid count-unit regex")
});

/// A lone integer answer.
static BARE_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,4})\s*$").expect("invalid bare-int regex"));

/// `<n>/10` severity form.
static RATIO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*/\s*10\b").expect("invalid ratio regex"));

/// Extract a duration in days.
///
/// Recognizes `<int> <unit>` with unit prefixes from the catalog
/// (`gün`/`hafta`/`ay` for tr-TR, suffixed forms like "gündür" included via
/// prefix match) and a bare integer, which is read as days.
pub fn duration_days(text: &str, sets: &ParserSets) -> Option<u32> {
    let normalized = normalize(text);

    for captures in COUNT_UNIT_RE.captures_iter(&normalized) {
        let Ok(count) = captures[1].parse::<u32>() else {
            continue;
        };
        let unit_word = &captures[2];
        for unit in &sets.duration_units {
            if unit_word.starts_with(unit.prefix.as_str()) {
                return Some(count * unit.days);
            }
        }
    }

    // Bare integer answers ("5") are taken as days.
    if let Some(captures) = BARE_INT_RE.captures(&normalized) {
        return captures[1].parse().ok();
    }

    None
}

/// Extract a 0–10 severity rating: `<n>/10`, a bare integer in range, or a
/// lexical severity word from the catalog table.
pub fn severity_0_10(text: &str, sets: &ParserSets) -> Option<u8> {
    let normalized = normalize(text);

    if let Some(captures) = RATIO_RE.captures(&normalized) {
        if let Ok(value) = captures[1].parse::<u8>() {
            if value <= 10 {
                return Some(value);
            }
        }
    }

    for token in normalized.split(' ') {
        if let Ok(value) = token.parse::<u8>() {
            if value <= 10 {
                return Some(value);
            }
        }
    }

    // Longest word first, so "çok şiddetli" beats "şiddetli".
    let mut words: Vec<(&String, &u8)> = sets.severity_words.iter().collect();
    words.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(b.0)));
    for (word, value) in words {
        if normalized.contains(word.as_str()) {
            return Some(*value);
        }
    }

    None
}

/// Classify the answer into a time of day by catalog keyword.
pub fn timing(text: &str, sets: &ParserSets) -> Option<Timing> {
    let normalized = normalize(text);
    let mut words: Vec<(&String, &Timing)> = sets.timing_words.iter().collect();
    words.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(b.0)));
    for (word, value) in words {
        if normalized.contains(word.as_str()) {
            return Some(*value);
        }
    }
    None
}

/// Run the sub-parsers applicable to this canonical.
pub fn parse_free_text(canonical: &str, raw: &str, sets: &ParserSets) -> ParsedAnswer {
    let mut parsed = ParsedAnswer::default();
    if sets.duration_canonicals.contains(canonical) {
        parsed.duration_days = duration_days(raw, sets);
    }
    if sets.severity_canonicals.contains(canonical) {
        parsed.severity_0_10 = severity_0_10(raw, sets);
    }
    if sets.timing_canonicals.contains(canonical) {
        parsed.timing = timing(raw, sets);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    use crate::catalog::types::DurationUnit;

    fn sets() -> ParserSets {
        ParserSets {
            duration_canonicals: BTreeSet::from(["öksürük süresi".to_string()]),
            severity_canonicals: BTreeSet::from(["ağrı şiddeti".to_string()]),
            timing_canonicals: BTreeSet::from(["öksürük gece artışı".to_string()]),
            duration_units: vec![
                DurationUnit { prefix: "gün".into(), days: 1 },
                DurationUnit { prefix: "hafta".into(), days: 7 },
                DurationUnit { prefix: "ay".into(), days: 30 },
            ],
            severity_words: BTreeMap::from([
                ("hafif".to_string(), 2u8),
                ("orta".to_string(), 6u8),
                ("şiddetli".to_string(), 8u8),
            ]),
            timing_words: BTreeMap::from([
                ("sabah".to_string(), Timing::Morning),
                ("akşam".to_string(), Timing::Evening),
                ("gece".to_string(), Timing::Night),
                ("gündüz".to_string(), Timing::Day),
            ]),
        }
    }

    // ── duration ────────────────────────────────────────────

    #[test]
    fn duration_days_with_suffix() {
        assert_eq!(duration_days("3 gündür", &sets()), Some(3));
        assert_eq!(duration_days("3 gün oldu", &sets()), Some(3));
    }

    #[test]
    fn duration_weeks_and_months_convert() {
        assert_eq!(duration_days("2 haftadır sürüyor", &sets()), Some(14));
        assert_eq!(duration_days("1 aydır", &sets()), Some(30));
    }

    #[test]
    fn duration_bare_integer_is_days() {
        assert_eq!(duration_days("5", &sets()), Some(5));
    }

    #[test]
    fn duration_unparsable_is_none() {
        assert_eq!(duration_days("uzun zamandır", &sets()), None);
        assert_eq!(duration_days("", &sets()), None);
    }

    // ── severity ────────────────────────────────────────────

    #[test]
    fn severity_n_over_10() {
        assert_eq!(severity_0_10("7/10 diyebilirim", &sets()), Some(7));
        assert_eq!(severity_0_10("10/10", &sets()), Some(10));
    }

    #[test]
    fn severity_bare_integer_in_range() {
        assert_eq!(severity_0_10("8", &sets()), Some(8));
        assert_eq!(severity_0_10("0", &sets()), Some(0));
    }

    #[test]
    fn severity_out_of_range_integer_ignored() {
        assert_eq!(severity_0_10("15", &sets()), None);
    }

    #[test]
    fn severity_lexical_words() {
        assert_eq!(severity_0_10("hafif bir ağrı", &sets()), Some(2));
        assert_eq!(severity_0_10("orta diyebilirim", &sets()), Some(6));
        assert_eq!(severity_0_10("çok şiddetli", &sets()), Some(8));
    }

    // ── timing ──────────────────────────────────────────────

    #[test]
    fn timing_keywords_classify() {
        assert_eq!(timing("sabahları oluyor", &sets()), Some(Timing::Morning));
        assert_eq!(timing("genelde geceleri", &sets()), Some(Timing::Night));
        assert_eq!(timing("akşam artıyor", &sets()), Some(Timing::Evening));
        assert_eq!(timing("gündüz de var", &sets()), Some(Timing::Day));
    }

    #[test]
    fn timing_unmatched_is_none() {
        assert_eq!(timing("her zaman", &sets()), None);
    }

    // ── dispatch ────────────────────────────────────────────

    #[test]
    fn dispatch_runs_only_applicable_parsers() {
        let parsed = parse_free_text("öksürük süresi", "2 haftadır", &sets());
        assert_eq!(parsed.duration_days, Some(14));
        assert_eq!(parsed.severity_0_10, None);
        assert_eq!(parsed.timing, None);

        let parsed = parse_free_text("ağrı şiddeti", "7/10", &sets());
        assert_eq!(parsed.severity_0_10, Some(7));
        assert_eq!(parsed.duration_days, None);
    }

    #[test]
    fn dispatch_unknown_canonical_yields_empty() {
        let parsed = parse_free_text("bulantı", "3 gündür çok şiddetli", &sets());
        assert!(parsed.is_empty());
    }

    #[test]
    fn dispatch_unparsable_input_yields_empty() {
        let parsed = parse_free_text("öksürük süresi", "bilmiyorum", &sets());
        assert!(parsed.is_empty());
    }
}
