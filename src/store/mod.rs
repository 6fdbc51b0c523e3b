//! Session persistence.
//!
//! The engine only ever talks to the `SessionStore` trait: load, save,
//! append an event, mint an id. Events for one session are totally ordered
//! and the append is idempotent by `(session_id, turn_index, envelope_type)`
//! so a retried turn cannot duplicate its event.

pub mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::envelope::EnvelopeType;
use crate::models::session::Session;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// One appended envelope event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub session_id: String,
    pub turn_index: u32,
    pub envelope_type: EnvelopeType,
    pub payload: serde_json::Value,
    pub created_at: NaiveDateTime,
}

/// The only database contract the core imposes.
pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Append-only; idempotent by `(session_id, turn_index, envelope_type)`.
    fn append_event(
        &self,
        session_id: &str,
        turn_index: u32,
        envelope_type: EnvelopeType,
        payload: &serde_json::Value,
    ) -> Result<(), StoreError>;

    fn create_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    events: Mutex<Vec<StoredEvent>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for one session, in append order (test helper).
    pub fn events_for(&self, session_id: &str) -> Vec<StoredEvent> {
        self.events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.session_id == session_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.get(session_id).cloned())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::LockPoisoned)?;
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    fn append_event(
        &self,
        session_id: &str,
        turn_index: u32,
        envelope_type: EnvelopeType,
        payload: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut events = self.events.lock().map_err(|_| StoreError::LockPoisoned)?;
        let duplicate = events.iter().any(|e| {
            e.session_id == session_id
                && e.turn_index == turn_index
                && e.envelope_type == envelope_type
        });
        if duplicate {
            return Ok(());
        }
        events.push(StoredEvent {
            session_id: session_id.to_string(),
            turn_index,
            envelope_type,
            payload: payload.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> Session {
        Session::new(id.into(), "tr-TR".into(), chrono::Utc::now().naive_utc())
    }

    #[test]
    fn load_missing_session_is_none() {
        let store = MemorySessionStore::new();
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemorySessionStore::new();
        let mut s = session("s-1");
        s.confirm_symptom("ateş");
        s.turn_index = 3;
        store.save(&s).unwrap();

        let loaded = store.load("s-1").unwrap().unwrap();
        assert_eq!(loaded.turn_index, 3);
        assert!(loaded.known_symptoms.contains("ateş"));
    }

    #[test]
    fn save_overwrites_previous_state() {
        let store = MemorySessionStore::new();
        let mut s = session("s-1");
        store.save(&s).unwrap();
        s.turn_index = 1;
        store.save(&s).unwrap();
        assert_eq!(store.load("s-1").unwrap().unwrap().turn_index, 1);
    }

    #[test]
    fn append_event_is_idempotent() {
        let store = MemorySessionStore::new();
        let payload = serde_json::json!({"x": 1});
        store
            .append_event("s-1", 1, EnvelopeType::Question, &payload)
            .unwrap();
        store
            .append_event("s-1", 1, EnvelopeType::Question, &payload)
            .unwrap();
        store
            .append_event("s-1", 2, EnvelopeType::Result, &payload)
            .unwrap();

        let events = store.events_for("s-1");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].turn_index, 1);
        assert_eq!(events[1].turn_index, 2);
    }

    #[test]
    fn events_are_isolated_per_session() {
        let store = MemorySessionStore::new();
        let payload = serde_json::json!({});
        store
            .append_event("a", 1, EnvelopeType::Question, &payload)
            .unwrap();
        store
            .append_event("b", 1, EnvelopeType::Question, &payload)
            .unwrap();
        assert_eq!(store.events_for("a").len(), 1);
        assert_eq!(store.events_for("b").len(), 1);
    }

    #[test]
    fn create_id_is_unique_and_opaque() {
        let store = MemorySessionStore::new();
        let a = store.create_id();
        let b = store.create_id();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }
}
