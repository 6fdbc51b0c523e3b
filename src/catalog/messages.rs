//! Message template helpers.
//!
//! Catalog message entries may carry `{placeholder}` slots; `fill` resolves
//! them. Unknown placeholders are left in place so a template/catalog
//! mismatch stays visible in the output instead of silently dropping text.

/// Replace `{key}` placeholders in a template.
pub fn fill(template: &str, pairs: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in pairs {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_all_occurrences() {
        let out = fill(
            "'{phrase}' ifadesi {specialty} ile eşleşti (+{points})",
            &[
                ("phrase", "göğsüm ağrıyor".to_string()),
                ("specialty", "Kardiyoloji".to_string()),
                ("points", "5".to_string()),
            ],
        );
        assert_eq!(out, "'göğsüm ağrıyor' ifadesi Kardiyoloji ile eşleşti (+5)");
    }

    #[test]
    fn fill_leaves_unknown_placeholders_visible() {
        let out = fill("{a} ve {b}", &[("a", "bir".to_string())]);
        assert_eq!(out, "bir ve {b}");
    }

    #[test]
    fn fill_without_placeholders_is_identity() {
        assert_eq!(fill("düz metin", &[]), "düz metin");
    }
}
