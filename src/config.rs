use std::path::PathBuf;

/// Crate-level constants
pub const APP_NAME: &str = "Ontriyaj";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Locale every lookup falls back to.
pub const DEFAULT_LOCALE: &str = "tr-TR";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info,ontriyaj=debug"
}

/// Directory holding the catalog JSON files when loading from disk
/// (the same files are also compiled in via `Catalog::load_embedded`).
pub fn default_catalog_dir() -> PathBuf {
    PathBuf::from("resources/catalogs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_ontriyaj() {
        assert_eq!(APP_NAME, "Ontriyaj");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.4.0");
    }

    #[test]
    fn catalog_dir_points_at_resources() {
        assert!(default_catalog_dir().ends_with("catalogs"));
    }
}
