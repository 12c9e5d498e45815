use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::PortalResult;
use crate::models::{Role, Session};

const KEY_ROLE: &str = "role";
const KEY_TOKEN: &str = "token";
const KEY_STUDENT_ID: &str = "studentId";

/// Local key-value store holding the persisted session marker.
///
/// All reads and writes of the session go through this type.
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    pub fn open(path: &str) -> PortalResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> PortalResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> PortalResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // a poisoned lock still holds a consistent connection
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(conn: &Connection, key: &str) -> PortalResult<Option<String>> {
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Current session, if one is stored and well formed.
    pub fn load(&self) -> PortalResult<Option<Session>> {
        let conn = self.conn();
        let role = match Self::get(&conn, KEY_ROLE)? {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => role,
                Err(_) => {
                    tracing::warn!(role = %raw, "Ignoring unrecognised stored role");
                    return Ok(None);
                }
            },
            None => return Ok(None),
        };
        let token = match Self::get(&conn, KEY_TOKEN)? {
            Some(token) => token,
            None => return Ok(None),
        };
        let student_id = Self::get(&conn, KEY_STUDENT_ID)?;
        Ok(Some(Session {
            role,
            token,
            student_id,
        }))
    }

    /// Role marker alone; this is what route guards read.
    pub fn role(&self) -> Option<Role> {
        match self.load() {
            Ok(session) => session.map(|s| s.role),
            Err(err) => {
                tracing::error!(error = %err, "Failed to read session role");
                None
            }
        }
    }

    pub fn token(&self) -> PortalResult<Option<String>> {
        Ok(self.load()?.map(|s| s.token))
    }

    pub fn save(&self, session: &Session) -> PortalResult<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let upsert = "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?) \
                      ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
        tx.execute(upsert, params![KEY_ROLE, session.role.as_str(), now])?;
        tx.execute(upsert, params![KEY_TOKEN, session.token, now])?;
        match &session.student_id {
            Some(id) => {
                tx.execute(upsert, params![KEY_STUDENT_ID, id, now])?;
            }
            None => {
                tx.execute("DELETE FROM kv WHERE key = ?", params![KEY_STUDENT_ID])?;
            }
        }
        tx.commit()?;
        tracing::debug!(role = %session.role, "Session stored");
        Ok(())
    }

    pub fn clear(&self) -> PortalResult<()> {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM kv WHERE key IN (?, ?, ?)",
            params![KEY_ROLE, KEY_TOKEN, KEY_STUDENT_ID],
        )?;
        tracing::debug!("Session cleared");
        Ok(())
    }
}
