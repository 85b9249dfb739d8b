// src/store/store.rs — SQLite operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};

use crate::bot::session::{ChartDraft, EntryDraft, Phase, UserSession};

/// Low-level row operations for the users table. Draft and entry-list
/// columns are stored as JSON.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_user(&self, session: &UserSession) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO users (id, display_name, remote_token, remote_username, phase,
             chart_draft, entry_draft, cached_entries, editing_existing, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                session.id,
                session.display_name,
                session.remote_token,
                session.remote_username,
                session.phase.as_str(),
                serde_json::to_string(&session.chart_draft)?,
                serde_json::to_string(&session.entry_draft)?,
                serde_json::to_string(&session.cached_entries)?,
                session.editing_existing,
                now
            ],
        )?;
        Ok(())
    }

    /// Overwrite every mutable column of an existing row.
    pub fn update_user(&self, session: &UserSession) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE users SET display_name = ?1, remote_token = ?2, remote_username = ?3,
             phase = ?4, chart_draft = ?5, entry_draft = ?6, cached_entries = ?7,
             editing_existing = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                session.display_name,
                session.remote_token,
                session.remote_username,
                session.phase.as_str(),
                serde_json::to_string(&session.chart_draft)?,
                serde_json::to_string(&session.entry_draft)?,
                serde_json::to_string(&session.cached_entries)?,
                session.editing_existing,
                now,
                session.id
            ],
        )?;
        Ok(())
    }

    /// Load every stored user row. Used once, to fill the directory cache.
    pub fn fetch_all_users(&self) -> anyhow::Result<Vec<UserSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display_name, remote_token, remote_username, phase,
             chart_draft, entry_draft, cached_entries, editing_existing
             FROM users",
        )?;

        let rows = stmt.query_map([], row_to_session)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<UserSession> {
    let phase_str: String = row.get(4)?;
    let chart_json: String = row.get(5)?;
    let entry_json: String = row.get(6)?;
    let cached_json: String = row.get(7)?;

    // Unknown phases and malformed JSON fall back to a clean slate rather
    // than wedging the whole bulk load.
    Ok(UserSession {
        id: row.get(0)?,
        display_name: row.get(1)?,
        remote_token: row.get(2)?,
        remote_username: row.get(3)?,
        phase: Phase::parse(&phase_str).unwrap_or_default(),
        chart_draft: serde_json::from_str::<ChartDraft>(&chart_json).unwrap_or_default(),
        entry_draft: serde_json::from_str::<EntryDraft>(&entry_json).unwrap_or_default(),
        cached_entries: serde_json::from_str(&cached_json).unwrap_or_default(),
        editing_existing: row.get(8)?,
    })
}
