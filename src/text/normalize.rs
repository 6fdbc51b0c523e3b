//! Deterministic text canonicalization.
//!
//! Everything downstream (symptom interpretation, specialty scoring, answer
//! parsing) operates on the output of `normalize`, so the rules here are the
//! single place where surface text is tamed: Turkish-aware case folding,
//! punctuation to spaces, whitespace collapse.

/// Punctuation replaced by a single space.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '{', '}', '[', ']', '"', '\'', '`', '~',
];

/// Turkish-aware lowercase of a single character.
///
/// The dotted/dotless distinction cannot be left to `to_lowercase`:
/// `İ` must become `i` and `I` must become `ı`.
fn fold_char(ch: char, out: &mut String) {
    match ch {
        'İ' => out.push('i'),
        'I' => out.push('ı'),
        other => out.extend(other.to_lowercase()),
    }
}

/// Normalize free text for matching.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        if PUNCTUATION.contains(&ch) {
            folded.push(' ');
        } else {
            fold_char(ch, &mut folded);
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
