use std::collections::BTreeSet;

use ob_domain::error::{Error, Result};
use ob_domain::{ClarityGained, Mood, Reflection};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::codec::{from_json, parse_enum, parse_ts, parse_uuid, to_json, ts};
use crate::db::{from_sqlite, Store};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of a cursor-paginated listing. `next_cursor` is the id of the
/// last item when more rows follow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn page_size(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

struct ReflectionRow {
    id: String,
    user_id: String,
    created_at: String,
    wins: String,
    struggles: String,
    journal: Option<String>,
    mood: Option<String>,
    tags: String,
    emotion: Option<String>,
    cognitive_load: Option<i64>,
    control_rating: Option<i64>,
    clarity_gained: Option<String>,
    grounding_strategies: String,
}

impl ReflectionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            created_at: row.get(2)?,
            wins: row.get(3)?,
            struggles: row.get(4)?,
            journal: row.get(5)?,
            mood: row.get(6)?,
            tags: row.get(7)?,
            emotion: row.get(8)?,
            cognitive_load: row.get(9)?,
            control_rating: row.get(10)?,
            clarity_gained: row.get(11)?,
            grounding_strategies: row.get(12)?,
        })
    }

    fn decode(self) -> Result<Reflection> {
        Ok(Reflection {
            id: parse_uuid("reflections.id", &self.id)?,
            user_id: self.user_id,
            created_at: parse_ts("reflections.created_at", &self.created_at)?,
            wins: self.wins,
            struggles: self.struggles,
            journal: self.journal,
            mood: self
                .mood
                .map(|m| parse_enum::<Mood>("reflections.mood", &m))
                .transpose()?,
            tags: from_json::<BTreeSet<String>>("reflections.tags", &self.tags)?,
            emotion: self.emotion,
            cognitive_load: self.cognitive_load.map(|v| v.clamp(0, 100) as u8),
            control_rating: self.control_rating.map(|v| v.clamp(0, 5) as u8),
            clarity_gained: self.clarity_gained.as_deref().and_then(ClarityGained::parse),
            grounding_strategies: from_json(
                "reflections.grounding_strategies",
                &self.grounding_strategies,
            )?,
        })
    }
}

impl Store {
    pub fn create_reflection(&self, r: &Reflection) -> Result<()> {
        let tags = to_json(&r.tags)?;
        let strategies = to_json(&r.grounding_strategies)?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO reflections (id, user_id, created_at, wins, struggles, journal,
                    mood, tags, emotion, cognitive_load, control_rating, clarity_gained,
                    grounding_strategies)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    r.id.to_string(),
                    r.user_id,
                    ts(&r.created_at),
                    r.wins,
                    r.struggles,
                    r.journal,
                    r.mood.map(Mood::as_str),
                    tags,
                    r.emotion,
                    r.cognitive_load,
                    r.control_rating,
                    r.clarity_gained.map(ClarityGained::as_str),
                    strategies,
                ],
            )
            .map_err(from_sqlite)?;
            Ok(())
        })
    }

    /// Newest-first page of the user's reflections. `cursor` is the id of the
    /// last reflection of the previous page.
    pub fn list_reflections(
        &self,
        user_id: &str,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Page<Reflection>> {
        let limit = page_size(limit);

        let rows = self.with_connection(|conn| {
            // Resolve the cursor to its sort key; an id we never issued to this
            // user is a client error, not an empty page.
            let after: Option<(String, String)> = match cursor {
                None => None,
                Some(c) => {
                    let key = Uuid::parse_str(c)
                        .ok()
                        .map(|id| id.to_string())
                        .map(|id| {
                            conn.query_row(
                                "SELECT created_at, id FROM reflections
                                 WHERE user_id = ?1 AND id = ?2",
                                params![user_id, id],
                                |row| Ok((row.get(0)?, row.get(1)?)),
                            )
                            .optional()
                            .map_err(from_sqlite)
                        })
                        .transpose()?
                        .flatten();
                    match key {
                        Some(k) => Some(k),
                        None => return Err(Error::invalid("cursor", "unknown cursor")),
                    }
                }
            };
            let (after_ts, after_id) = after.unzip();

            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, created_at, wins, struggles, journal, mood, tags,
                        emotion, cognitive_load, control_rating, clarity_gained,
                        grounding_strategies
                     FROM reflections
                     WHERE user_id = ?1
                       AND (?2 IS NULL OR created_at < ?2 OR (created_at = ?2 AND id < ?3))
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?4",
                )
                .map_err(from_sqlite)?;
            let rows = stmt
                .query_map(
                    params![user_id, after_ts, after_id, (limit + 1) as i64],
                    ReflectionRow::read,
                )
                .map_err(from_sqlite)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(from_sqlite)?;
            Ok(rows)
        })?;

        let mut items = rows
            .into_iter()
            .map(ReflectionRow::decode)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|r| r.id.to_string())
        } else {
            None
        };
        Ok(Page { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ob_domain::NewReflection;

    fn reflection(user: &str, wins: &str, minutes_ago: i64) -> Reflection {
        let mut r = Reflection::new(
            user,
            NewReflection {
                wins: wins.into(),
                ..Default::default()
            },
        );
        r.created_at = Utc::now() - Duration::minutes(minutes_ago);
        r
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(page_size(Some(0)), 1);
        assert_eq!(page_size(Some(500)), MAX_PAGE_SIZE);
    }

    #[test]
    fn optional_fields_survive_storage() {
        let store = Store::open_in_memory().unwrap();
        let mut r = reflection("u1", "Shipped it", 0);
        r.mood = Some(Mood::Calm);
        r.cognitive_load = Some(40);
        r.control_rating = Some(4);
        r.clarity_gained = Some(ClarityGained::Unsure);
        r.grounding_strategies = vec!["walk".into()];
        store.create_reflection(&r).unwrap();

        let page = store.list_reflections("u1", None, None).unwrap();
        assert_eq!(page.items, vec![r]);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn cursor_walks_every_item_once_newest_first() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .create_reflection(&reflection("u1", &format!("win {i}"), i))
                .unwrap();
        }
        store.create_reflection(&reflection("u2", "other", 0)).unwrap();

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = store
                .list_reflections("u1", Some(2), cursor.as_deref())
                .unwrap();
            assert!(page.items.len() <= 2);
            seen.extend(page.items.into_iter().map(|r| r.wins));
            match page.next_cursor {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }
        assert_eq!(seen, vec!["win 0", "win 1", "win 2", "win 3", "win 4"]);
    }

    #[test]
    fn unknown_cursor_is_a_validation_error() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .list_reflections("u1", None, Some("not-a-cursor"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let other = reflection("u2", "theirs", 0);
        store.create_reflection(&other).unwrap();
        let err = store
            .list_reflections("u1", None, Some(&other.id.to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
