use ob_domain::error::{Error, Result};
use ob_domain::{ChatMessage, ChatRole};
use rusqlite::params;

use crate::codec::{parse_ts, parse_uuid, ts};
use crate::db::{from_sqlite, Store};

impl Store {
    /// Append one transcript entry. Messages are never edited or removed.
    pub fn append_message(&self, user_id: &str, msg: &ChatMessage) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    msg.id.to_string(),
                    user_id,
                    msg.role.as_str(),
                    msg.content,
                    ts(&msg.timestamp),
                ],
            )
            .map_err(from_sqlite)?;
            Ok(())
        })
    }

    /// The user's last `limit` messages, oldest first.
    pub fn recent_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let rows: Vec<(String, String, String, String)> = self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, role, content, created_at FROM messages
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(from_sqlite)?;
            let rows = stmt
                .query_map(params![user_id, limit as i64], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .map_err(from_sqlite)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(from_sqlite)?;
            Ok(rows)
        })?;

        let mut messages = rows
            .into_iter()
            .map(|(id, role, content, created_at)| {
                Ok(ChatMessage {
                    id: parse_uuid("messages.id", &id)?,
                    role: ChatRole::parse(&role).ok_or_else(|| {
                        Error::Database(format!("corrupt value in column 'messages.role': {role}"))
                    })?,
                    content,
                    timestamp: parse_ts("messages.created_at", &created_at)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_messages_are_chronological_and_bounded() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..4 {
            store
                .append_message("u1", &ChatMessage::user(format!("m{i}")))
                .unwrap();
        }
        store
            .append_message("u2", &ChatMessage::assistant("elsewhere"))
            .unwrap();

        let recent = store.recent_messages("u1", 3).unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m1", "m2", "m3"]);
        assert!(recent.iter().all(|m| m.role == ChatRole::User));
    }
}
