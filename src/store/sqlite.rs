//! SQLite-backed session store.
//!
//! Session state is persisted as one JSON document per row; the event log is
//! append-only with a unique index providing the idempotency guarantee.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::envelope::EnvelopeType;
use crate::models::session::Session;

use super::{SessionStore, StoreError, StoredEvent};

/// Open a SQLite connection to the given path and run migrations.
pub fn open_database(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory_database() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> =
        vec![(1, include_str!("../../resources/migrations/001_initial.sql"))];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Store implementation over a single SQLite connection.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_database(path)?),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(open_memory_database()?),
        })
    }

    /// Events for one session, in append order (test helper).
    pub fn events_for(&self, session_id: &str) -> Result<Vec<StoredEvent>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT session_id, turn_index, envelope_type, payload, created_at
             FROM session_events WHERE session_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (session_id, turn_index, envelope_type, payload, created_at) = row?;
            events.push(StoredEvent {
                session_id,
                turn_index: turn_index as u32,
                envelope_type: EnvelopeType::from_str(&envelope_type)
                    .map_err(StoreError::Serialization)?,
                payload: serde_json::from_str(&payload)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?,
                created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| {
                        NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%dT%H:%M:%S%.f")
                    })
                    .unwrap_or_default(),
            });
        }
        Ok(events)
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let state: Option<String> = conn
            .query_row(
                "SELECT state FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        state
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let state = serde_json::to_string(session)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        conn.execute(
            "INSERT INTO sessions (session_id, locale, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(session_id) DO UPDATE SET
                 state = excluded.state,
                 updated_at = excluded.updated_at",
            params![
                session.session_id,
                session.locale,
                state,
                session.created_at.to_string(),
                session.updated_at.to_string(),
            ],
        )?;
        Ok(())
    }

    fn append_event(
        &self,
        session_id: &str,
        turn_index: u32,
        envelope_type: EnvelopeType,
        payload: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT OR IGNORE INTO session_events
                 (session_id, turn_index, envelope_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session_id,
                i64::from(turn_index),
                envelope_type.as_str(),
                payload.to_string(),
            ],
        )?;
        Ok(())
    }
}
