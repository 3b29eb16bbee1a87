//! SQLite event store implementation.

use crate::{Event, EventKind, Result, SessionId};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;

/// Summary of one stored session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub message_count: usize,
}

/// SQLite-backed event store.
pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    /// Open or create an event store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory event store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    // `seq` keeps insertion order stable when timestamps collide.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                kind TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_session
                ON events(session_id, seq);
            "#,
        )?;
        Ok(())
    }

    /// Append an event to the store.
    pub fn append(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            "INSERT INTO events (id, session_id, timestamp, kind, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id.to_string(),
                event.session_id.to_string(),
                event.timestamp.to_rfc3339(),
                event.kind.name(),
                serde_json::to_string(&event.kind)?,
            ],
        )?;
        Ok(())
    }

    /// Load all events for a session, in insertion order.
    pub fn load_session(&self, session_id: SessionId) -> Result<Vec<Event>> {
        self.load_events(session_id, None)
    }

    /// Load events for a session, optionally restricted to one kind
    /// (`message`, `tool_call`, `tool_result`, ...).
    pub fn load_events(&self, session_id: SessionId, kind: Option<&str>) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, timestamp, data FROM events
             WHERE session_id = ?1 AND (?2 IS NULL OR kind = ?2)
             ORDER BY seq",
        )?;

        let events = stmt
            .query_map(params![session_id.to_string(), kind], |row| {
                let id: String = row.get(0)?;
                let session_id: String = row.get(1)?;
                let timestamp: String = row.get(2)?;
                let data: String = row.get(3)?;
                Ok((id, session_id, timestamp, data))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(id, session_id, timestamp, data)| {
                Some(Event {
                    id: id.parse().ok()?,
                    session_id: session_id.parse().ok()?,
                    timestamp: timestamp.parse().ok()?,
                    kind: serde_json::from_str::<EventKind>(&data).ok()?,
                })
            })
            .collect();

        Ok(events)
    }

    /// List all sessions, most recently started first.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id,
                    MIN(timestamp),
                    MAX(CASE WHEN kind = 'session_end' THEN timestamp END),
                    SUM(CASE WHEN kind = 'message' THEN 1 ELSE 0 END)
             FROM events
             GROUP BY session_id
             ORDER BY MIN(seq) DESC",
        )?;

        let sessions = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let started_at: String = row.get(1)?;
                let ended_at: Option<String> = row.get(2)?;
                let message_count: i64 = row.get(3)?;
                Ok((id, started_at, ended_at, message_count))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(id, started_at, ended_at, message_count)| {
                Some(SessionSummary {
                    id: id.parse().ok()?,
                    started_at: started_at.parse().ok()?,
                    ended_at: ended_at.and_then(|t| t.parse().ok()),
                    message_count: usize::try_from(message_count).unwrap_or(0),
                })
            })
            .collect();

        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn append_and_load_in_order() {
        let store = EventStore::in_memory().unwrap();
        let session = SessionId::new();

        store
            .append(&Event::new(session, EventKind::SessionStart))
            .unwrap();
        store
            .append(&Event::message(session, Role::User, "read notes.txt"))
            .unwrap();
        store
            .append(&Event::tool_call(session, "call_1", "read", "{}"))
            .unwrap();
        store
            .append(&Event::tool_result(session, "call_1", "read", "   1 | hi"))
            .unwrap();

        let events = store.load_session(session).unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.kind.name()).collect();
        assert_eq!(
            kinds,
            ["session_start", "message", "tool_call", "tool_result"]
        );
    }

    #[test]
    fn load_events_filters_by_kind() {
        let store = EventStore::in_memory().unwrap();
        let session = SessionId::new();
        store
            .append(&Event::message(session, Role::User, "hi"))
            .unwrap();
        store
            .append(&Event::tool_call(session, "call_1", "bash", "{}"))
            .unwrap();

        let calls = store.load_events(session, Some("tool_call")).unwrap();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0].kind, EventKind::ToolCall { .. }));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = EventStore::in_memory().unwrap();
        let a = SessionId::new();
        let b = SessionId::new();
        store.append(&Event::message(a, Role::User, "a")).unwrap();
        store.append(&Event::message(b, Role::User, "b")).unwrap();

        assert_eq!(store.load_session(a).unwrap().len(), 1);
        assert_eq!(store.load_session(b).unwrap().len(), 1);
    }

    #[test]
    fn list_sessions_summarizes() {
        let store = EventStore::in_memory().unwrap();
        let first = SessionId::new();
        let second = SessionId::new();

        store
            .append(&Event::new(first, EventKind::SessionStart))
            .unwrap();
        store
            .append(&Event::message(first, Role::User, "hello"))
            .unwrap();
        store
            .append(&Event::message(first, Role::Assistant, "hi"))
            .unwrap();
        store
            .append(&Event::new(first, EventKind::SessionEnd))
            .unwrap();
        store
            .append(&Event::new(second, EventKind::SessionStart))
            .unwrap();

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second);
        assert!(sessions[0].ended_at.is_none());
        assert_eq!(sessions[1].id, first);
        assert_eq!(sessions[1].message_count, 2);
        assert!(sessions[1].ended_at.is_some());
    }
}
