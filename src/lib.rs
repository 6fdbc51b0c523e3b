//! Ontriyaj: a policy-driven pre-triage engine.
//!
//! Free-text symptom descriptions go in; a deterministic question loop comes
//! out, ending in a specialty recommendation, an emergency stop, or an error
//! envelope. No randomness anywhere: the same catalogs and the same turns
//! always produce the same envelopes.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod facility;
pub mod models;
pub mod policy;
pub mod scoring;
pub mod selector;
pub mod store;
pub mod text;

use tracing_subscriber::EnvFilter;

pub use catalog::Catalog;
pub use engine::{TriageEngine, TurnAnswer, TurnRequest};
pub use envelope::{Envelope, EnvelopeType};
pub use store::{MemorySessionStore, SessionStore};

/// Initialize tracing for embedding binaries. RUST_LOG wins when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// The bundled catalogs load and pass basic shape checks.
    #[test]
    fn embedded_catalog_loads() {
        let catalog = Catalog::load_embedded();
        assert!(catalog.bank_for("tr-TR").unwrap().len() >= 20);
        assert!(catalog.bank_for("en-US").unwrap().len() >= 20);
        assert!(catalog.specialties.len() >= 8);
        assert!(catalog.disease_symptoms.len() >= 12);
        assert!(!catalog.emergency_rules.is_empty());
        assert!(!catalog.facilities.is_empty());
    }

    /// End-to-end over the bundled catalogs: the emergency scenario.
    #[test]
    fn embedded_emergency_short_circuit() {
        let engine = TriageEngine::new(
            Arc::new(Catalog::load_embedded()),
            MemorySessionStore::new(),
        );
        let envelope = engine.handle_turn(TurnRequest {
            session_id: None,
            locale: "tr-TR".into(),
            user_message: "göğüs ağrısı, baskı hissi ve terliyorum, nefes darlığı".into(),
            answer: None,
            profile: None,
            lat: None,
            lon: None,
        });
        assert_eq!(envelope.envelope_type(), EnvelopeType::Emergency);
        assert_eq!(envelope.turn_index, 1);
    }

    /// End-to-end over the bundled catalogs: free text yields a question and
    /// the session persists it.
    #[test]
    fn embedded_headache_first_turn_asks_a_question() {
        let engine = TriageEngine::new(
            Arc::new(Catalog::load_embedded()),
            MemorySessionStore::new(),
        );
        let envelope = engine.handle_turn(TurnRequest {
            session_id: None,
            locale: "tr-TR".into(),
            user_message: "Başım ağrıyor ve bulantı var".into(),
            answer: None,
            profile: None,
            lat: None,
            lon: None,
        });
        assert_eq!(envelope.envelope_type(), EnvelopeType::Question);

        let session = engine.store().load(&envelope.session_id).unwrap().unwrap();
        assert!(session.known_symptoms.contains("baş ağrısı"));
        assert!(session.known_symptoms.contains("bulantı"));
    }
}
