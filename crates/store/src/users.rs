use chrono::{DateTime, Utc};
use ob_domain::error::Result;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::codec::{parse_ts, ts};
use crate::db::{from_sqlite, Store};

/// An authenticated account. `id` is the auth provider's subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Insert the user on first sight; later calls only fill in a missing
    /// email.
    pub fn upsert_user(&self, id: &str, email: Option<&str>) -> Result<User> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET email = COALESCE(excluded.email, users.email)",
                params![id, email, ts(&Utc::now())],
            )
            .map_err(from_sqlite)?;

            let (id, email, created_at): (String, Option<String>, String) = conn
                .query_row(
                    "SELECT id, email, created_at FROM users WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .map_err(from_sqlite)?;
            Ok(User {
                id,
                email,
                created_at: parse_ts("users.created_at", &created_at)?,
            })
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.with_connection(|conn| {
            let row: Option<(String, Option<String>, String)> = conn
                .query_row(
                    "SELECT id, email, created_at FROM users WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
                .map_err(from_sqlite)?;
            row.map(|(id, email, created_at)| {
                Ok(User {
                    id,
                    email,
                    created_at: parse_ts("users.created_at", &created_at)?,
                })
            })
            .transpose()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_keeps_first_created_at_and_fills_email() {
        let store = Store::open_in_memory().unwrap();
        let first = store.upsert_user("u1", None).unwrap();
        assert!(first.email.is_none());

        let second = store.upsert_user("u1", Some("a@example.com")).unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.email.as_deref(), Some("a@example.com"));

        let third = store.upsert_user("u1", None).unwrap();
        assert_eq!(third.email.as_deref(), Some("a@example.com"));
        assert!(store.get_user("nobody").unwrap().is_none());
    }
}
