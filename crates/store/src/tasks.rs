use ob_domain::error::{Error, Result};
use ob_domain::{Mode, Priority, Subtask, Task, TaskPatch, TaskStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use uuid::Uuid;

use crate::codec::{from_json, parse_enum, parse_opt_ts, parse_ts, parse_uuid, to_json, ts};
use crate::db::{from_sqlite, Store};

const COLUMNS: &str = "id, user_id, title, description, status, priority, due_date, \
    estimated_minutes, mode, subtasks, tags, friction, created_at, updated_at, ai_generated";

/// Optional narrowing for [`Store::list_tasks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub mode: Option<Mode>,
}

/// A task row as SQLite hands it back, before decoding.
struct TaskRow {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: Option<String>,
    estimated_minutes: Option<i64>,
    mode: Option<String>,
    subtasks: String,
    tags: String,
    friction: i64,
    created_at: String,
    updated_at: Option<String>,
    ai_generated: bool,
}

impl TaskRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            priority: row.get(5)?,
            due_date: row.get(6)?,
            estimated_minutes: row.get(7)?,
            mode: row.get(8)?,
            subtasks: row.get(9)?,
            tags: row.get(10)?,
            friction: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
            ai_generated: row.get(14)?,
        })
    }

    fn decode(self) -> Result<Task> {
        Ok(Task {
            id: parse_uuid("tasks.id", &self.id)?,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            status: parse_enum::<TaskStatus>("tasks.status", &self.status)?,
            priority: parse_enum::<Priority>("tasks.priority", &self.priority)?,
            due_date: parse_opt_ts("tasks.due_date", self.due_date)?,
            estimated_minutes: self.estimated_minutes.map(|m| m.max(0) as u32),
            mode: self
                .mode
                .map(|m| parse_enum::<Mode>("tasks.mode", &m))
                .transpose()?,
            subtasks: from_json::<Vec<Subtask>>("tasks.subtasks", &self.subtasks)?,
            tags: from_json("tasks.tags", &self.tags)?,
            friction: self.friction.max(0) as u32,
            created_at: parse_ts("tasks.created_at", &self.created_at)?,
            updated_at: parse_opt_ts("tasks.updated_at", self.updated_at)?,
            ai_generated: self.ai_generated,
        })
    }
}

fn fetch_task(conn: &Connection, user_id: &str, id: Uuid) -> Result<Option<Task>> {
    let sql = format!("SELECT {COLUMNS} FROM tasks WHERE user_id = ?1 AND id = ?2");
    conn.query_row(&sql, params![user_id, id.to_string()], TaskRow::read)
        .optional()
        .map_err(from_sqlite)?
        .map(TaskRow::decode)
        .transpose()
}

impl Store {
    /// Insert a new task. Ids are chosen by the client, so a retried create
    /// returns the stored task instead of inserting it again; an id owned by
    /// another user is rejected.
    pub fn create_task(&self, task: &Task) -> Result<Option<Task>> {
        let subtasks = to_json(&task.subtasks)?;
        let tags = to_json(&task.tags)?;
        self.with_connection(|conn| {
            let owner: Option<String> = conn
                .query_row(
                    "SELECT user_id FROM tasks WHERE id = ?1",
                    params![task.id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_sqlite)?;
            match owner {
                Some(owner) if owner == task.user_id => {
                    return fetch_task(conn, &task.user_id, task.id);
                }
                Some(_) => return Err(Error::invalid("id", "already in use")),
                None => {}
            }
            conn.execute(
                &format!(
                    "INSERT INTO tasks ({COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
                ),
                params![
                    task.id.to_string(),
                    task.user_id,
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.due_date.as_ref().map(ts),
                    task.estimated_minutes,
                    task.mode.map(Mode::as_str),
                    subtasks,
                    tags,
                    task.friction,
                    ts(&task.created_at),
                    task.updated_at.as_ref().map(ts),
                    task.ai_generated,
                ],
            )
            .map_err(from_sqlite)?;
            Ok(None)
        })
    }

    pub fn get_task(&self, user_id: &str, id: Uuid) -> Result<Option<Task>> {
        self.with_connection(|conn| fetch_task(conn, user_id, id))
    }

    /// The user's tasks, newest first.
    pub fn list_tasks(&self, user_id: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE user_id = ?1
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL OR mode = ?3)
             ORDER BY created_at DESC, id DESC"
        );
        let rows = self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(from_sqlite)?;
            let rows = stmt
                .query_map(
                    params![
                        user_id,
                        filter.status.map(TaskStatus::as_str),
                        filter.mode.map(Mode::as_str),
                    ],
                    TaskRow::read,
                )
                .map_err(from_sqlite)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(from_sqlite)?;
            Ok(rows)
        })?;
        rows.into_iter().map(TaskRow::decode).collect()
    }

    /// Apply `patch` to the stored task. `None` when the task does not exist
    /// for this user.
    pub fn update_task(&self, user_id: &str, id: Uuid, patch: &TaskPatch) -> Result<Option<Task>> {
        self.with_connection(|conn| {
            let Some(mut task) = fetch_task(conn, user_id, id)? else {
                return Ok(None);
            };
            task.apply(patch);

            conn.execute(
                "UPDATE tasks SET title = ?3, description = ?4, status = ?5, priority = ?6,
                    due_date = ?7, estimated_minutes = ?8, mode = ?9, subtasks = ?10,
                    tags = ?11, friction = ?12, updated_at = ?13
                 WHERE user_id = ?1 AND id = ?2",
                params![
                    user_id,
                    id.to_string(),
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.due_date.as_ref().map(ts),
                    task.estimated_minutes,
                    task.mode.map(Mode::as_str),
                    to_json(&task.subtasks)?,
                    to_json(&task.tags)?,
                    task.friction,
                    task.updated_at.as_ref().map(ts),
                ],
            )
            .map_err(from_sqlite)?;
            Ok(Some(task))
        })
    }

    /// Returns whether a row was removed.
    pub fn delete_task(&self, user_id: &str, id: Uuid) -> Result<bool> {
        self.with_connection(|conn| {
            let n = conn
                .execute(
                    "DELETE FROM tasks WHERE user_id = ?1 AND id = ?2",
                    params![user_id, id.to_string()],
                )
                .map_err(from_sqlite)?;
            Ok(n > 0)
        })
    }
}
