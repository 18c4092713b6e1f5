//! SQLite-based walk session storage.
//!
//! Provides persistent storage for:
//! - Walk session records (created on start, finalized once on stop)
//! - Daily and all-time statistics
//! - A key-value store used to park engine state between invocations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::DatabaseError;
use crate::session::{SessionStore, SessionUpdate};

/// One row of walk history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkSessionRow {
    pub id: String,
    pub actor_id: String,
    pub duration_min: u32,
    pub intervals_completed: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub total_minutes: u64,
    pub total_intervals: u64,
}

/// SQLite database for walk history and parked engine state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/paceloop/paceloop.db`.
    ///
    /// Creates the file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?
            .join("paceloop.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        // Several CLI invocations may hit the file at once.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS walk_sessions (
                    id                  TEXT PRIMARY KEY,
                    actor_id            TEXT NOT NULL,
                    duration_min        INTEGER NOT NULL,
                    intervals_completed INTEGER NOT NULL DEFAULT 0,
                    started_at          TEXT NOT NULL,
                    completed_at        TEXT,
                    is_completed        INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_walk_sessions_started_at
                    ON walk_sessions(started_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Walk sessions ────────────────────────────────────────────────

    /// Insert a new session record and return its id.
    pub fn insert_walk_session(
        &self,
        actor_id: &str,
        duration_min: u32,
        started_at: DateTime<Utc>,
    ) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO walk_sessions (id, actor_id, duration_min, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, actor_id, duration_min, started_at.to_rfc3339()],
        )?;
        Ok(id)
    }

    /// Apply the single terminal update to a session record.
    pub fn finalize_walk_session(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE walk_sessions
             SET completed_at = ?2, intervals_completed = ?3, is_completed = ?4
             WHERE id = ?1",
            params![
                session_id,
                update.completed_at.map(|t| t.to_rfc3339()),
                update.intervals_completed,
                update.is_completed,
            ],
        )?;
        Ok(())
    }

    pub fn recent_sessions(&self, limit: u32) -> Result<Vec<WalkSessionRow>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, actor_id, duration_min, intervals_completed,
                    started_at, completed_at, is_completed
             FROM walk_sessions
             ORDER BY started_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(WalkSessionRow {
                id: row.get(0)?,
                actor_id: row.get(1)?,
                duration_min: row.get(2)?,
                intervals_completed: row.get(3)?,
                started_at: parse_ts(row.get::<_, String>(4)?, 4)?,
                completed_at: row
                    .get::<_, Option<String>>(5)?
                    .map(|t| parse_ts(t, 5))
                    .transpose()?,
                is_completed: row.get(6)?,
            })
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.stats_where(
            "WHERE started_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
        )
    }

    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        self.stats_where("", params![])
    }

    fn stats_where(
        &self,
        clause: &str,
        params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Stats, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_completed), 0),
                    COALESCE(SUM(CASE WHEN is_completed THEN duration_min ELSE 0 END), 0),
                    COALESCE(SUM(intervals_completed), 0)
             FROM walk_sessions {clause}"
        );
        let stats = self.conn.query_row(&sql, params, |row| {
            Ok(Stats {
                total_sessions: row.get(0)?,
                completed_sessions: row.get(1)?,
                total_minutes: row.get(2)?,
                total_intervals: row.get(3)?,
            })
        })?;
        Ok(stats)
    }
}

fn parse_ts(text: String, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl SessionStore for Database {
    fn create_session(
        &mut self,
        actor_id: &str,
        duration_min: u32,
    ) -> Result<String, Box<dyn std::error::Error>> {
        Ok(self.insert_walk_session(actor_id, duration_min, Utc::now())?)
    }

    fn update_session(
        &mut self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.finalize_walk_session(session_id, update)?)
    }
}
