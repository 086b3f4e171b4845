//! Mode/session lifecycle.
//!
//! A user has at most one open focus session. Switching mode closes every
//! open session and then opens a new one. The two steps are separate
//! statements: a failure in between leaves the user with no open session,
//! never with two.

use chrono::{DateTime, Utc};
use ob_domain::error::{FieldError, Result};
use ob_domain::trace::TraceEvent;
use ob_domain::{Energy, FocusSession, Mode, Validate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use uuid::Uuid;

use crate::codec::{parse_energy, parse_enum, parse_opt_ts, parse_ts, parse_uuid, ts};
use crate::db::{from_sqlite, Store};

const COLUMNS: &str = "id, user_id, mode, started_at, ended_at, start_energy, end_energy, task_id";

/// Input for [`Store::start_session`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSession {
    pub mode: Mode,
    #[serde(default)]
    pub energy: Option<Energy>,
    #[serde(default)]
    pub task_id: Option<Uuid>,
}

/// Mode and energy are range-checked while deserializing.
impl Validate for StartSession {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

/// The newly opened session plus whatever it closed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub session: FocusSession,
    pub closed: Vec<FocusSession>,
}

struct SessionRow {
    id: String,
    user_id: String,
    mode: String,
    started_at: String,
    ended_at: Option<String>,
    start_energy: Option<i64>,
    end_energy: Option<i64>,
    task_id: Option<String>,
}

impl SessionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            mode: row.get(2)?,
            started_at: row.get(3)?,
            ended_at: row.get(4)?,
            start_energy: row.get(5)?,
            end_energy: row.get(6)?,
            task_id: row.get(7)?,
        })
    }

    fn decode(self) -> Result<FocusSession> {
        Ok(FocusSession {
            id: parse_uuid("focus_sessions.id", &self.id)?,
            user_id: self.user_id,
            mode: parse_enum::<Mode>("focus_sessions.mode", &self.mode)?,
            started_at: parse_ts("focus_sessions.started_at", &self.started_at)?,
            ended_at: parse_opt_ts("focus_sessions.ended_at", self.ended_at)?,
            start_energy: parse_energy("focus_sessions.start_energy", self.start_energy)?,
            end_energy: parse_energy("focus_sessions.end_energy", self.end_energy)?,
            task_id: self
                .task_id
                .map(|t| parse_uuid("focus_sessions.task_id", &t))
                .transpose()?,
        })
    }
}

fn open_sessions(conn: &Connection, user_id: &str) -> Result<Vec<FocusSession>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM focus_sessions
         WHERE user_id = ?1 AND ended_at IS NULL
         ORDER BY started_at DESC"
    );
    let mut stmt = conn.prepare(&sql).map_err(from_sqlite)?;
    let rows = stmt
        .query_map([user_id], SessionRow::read)
        .map_err(from_sqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_sqlite)?;
    rows.into_iter().map(SessionRow::decode).collect()
}

/// Close every open session for the user and return them as closed.
fn close_open(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
    energy: Option<Energy>,
) -> Result<Vec<FocusSession>> {
    let mut closed = open_sessions(conn, user_id)?;
    if closed.is_empty() {
        return Ok(closed);
    }
    conn.execute(
        "UPDATE focus_sessions SET ended_at = ?2, end_energy = ?3
         WHERE user_id = ?1 AND ended_at IS NULL",
        params![user_id, ts(&now), energy.map(Energy::value)],
    )
    .map_err(from_sqlite)?;

    for s in &mut closed {
        s.ended_at = Some(now);
        s.end_energy = energy;
        TraceEvent::SessionClosed {
            user_id: user_id.to_string(),
            session_id: s.id.to_string(),
            duration_secs: s.duration().map(|d| d.num_seconds()),
        }
        .emit();
    }
    Ok(closed)
}

impl Store {
    /// Switch the user into `input.mode`: close any open session, then open
    /// a new one. Starting energy defaults to [`Energy::default`].
    pub fn start_session(&self, user_id: &str, input: StartSession) -> Result<SessionStart> {
        self.with_connection(|conn| {
            let closed = close_open(conn, user_id, Utc::now(), input.energy)?;

            let session = FocusSession::start(
                user_id,
                input.mode,
                Some(input.energy.unwrap_or_default()),
                input.task_id,
            );
            conn.execute(
                &format!("INSERT INTO focus_sessions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                params![
                    session.id.to_string(),
                    session.user_id,
                    session.mode.as_str(),
                    ts(&session.started_at),
                    Option::<String>::None,
                    session.start_energy.map(Energy::value),
                    Option::<u8>::None,
                    session.task_id.map(|t| t.to_string()),
                ],
            )
            .map_err(from_sqlite)?;

            TraceEvent::SessionStarted {
                user_id: user_id.to_string(),
                session_id: session.id.to_string(),
                mode: session.mode.as_str().to_string(),
                closed_previous: closed.len(),
            }
            .emit();

            Ok(SessionStart { session, closed })
        })
    }

    /// Close the open session, if any, recording the ending energy.
    pub fn end_active_session(
        &self,
        user_id: &str,
        energy: Option<Energy>,
    ) -> Result<Option<FocusSession>> {
        self.with_connection(|conn| {
            let closed = close_open(conn, user_id, Utc::now(), energy)?;
            Ok(closed.into_iter().next())
        })
    }

    pub fn active_session(&self, user_id: &str) -> Result<Option<FocusSession>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM focus_sessions
             WHERE user_id = ?1 AND ended_at IS NULL
             ORDER BY started_at DESC LIMIT 1"
        );
        self.with_connection(|conn| {
            conn.query_row(&sql, [user_id], SessionRow::read)
                .optional()
                .map_err(from_sqlite)?
                .map(SessionRow::decode)
                .transpose()
        })
    }

    /// Most recent sessions first, open or closed.
    pub fn list_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<FocusSession>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM focus_sessions
             WHERE user_id = ?1
             ORDER BY started_at DESC, id DESC
             LIMIT ?2"
        );
        let rows = self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(from_sqlite)?;
            let rows = stmt
                .query_map(params![user_id, limit as i64], SessionRow::read)
                .map_err(from_sqlite)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(from_sqlite)?;
            Ok(rows)
        })?;
        rows.into_iter().map(SessionRow::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(mode: Mode, energy: Option<u8>) -> StartSession {
        StartSession {
            mode,
            energy: energy.map(|e| Energy::new(e).unwrap()),
            task_id: None,
        }
    }

    #[test]
    fn first_session_closes_nothing_and_defaults_energy() {
        let store = Store::open_in_memory().unwrap();
        let out = store.start_session("u1", start(Mode::Build, None)).unwrap();
        assert!(out.closed.is_empty());
        assert!(out.session.is_open());
        assert_eq!(out.session.start_energy, Some(Energy::default()));
        assert_eq!(store.active_session("u1").unwrap(), Some(out.session));
    }

    #[test]
    fn switching_mode_closes_previous_with_energy() {
        let store = Store::open_in_memory().unwrap();
        let first = store.start_session("u1", start(Mode::Build, Some(80))).unwrap();
        let second = store.start_session("u1", start(Mode::Restore, Some(25))).unwrap();

        assert_eq!(second.closed.len(), 1);
        let closed = &second.closed[0];
        assert_eq!(closed.id, first.session.id);
        assert_eq!(closed.end_energy, Some(Energy::new(25).unwrap()));
        assert!(closed.duration().is_some());

        let active = store.active_session("u1").unwrap().unwrap();
        assert_eq!(active.id, second.session.id);
        assert_eq!(active.mode, Mode::Restore);
    }

    #[test]
    fn end_active_session_leaves_none_open() {
        let store = Store::open_in_memory().unwrap();
        store.start_session("u1", start(Mode::Flow, None)).unwrap();
        let ended = store
            .end_active_session("u1", Energy::new(10).ok())
            .unwrap()
            .unwrap();
        assert!(!ended.is_open());
        assert!(store.active_session("u1").unwrap().is_none());
        assert!(store.end_active_session("u1", None).unwrap().is_none());
    }
}
