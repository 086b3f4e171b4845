//! Column encodings shared by the repositories.
//!
//! Timestamps are stored as fixed-width RFC 3339 text (nanoseconds, `Z`)
//! so lexical order equals chronological order.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use ob_domain::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub(crate) fn ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(column: &str, s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(column, e))
}

pub(crate) fn parse_opt_ts(column: &str, s: Option<String>) -> Result<Option<DateTime<Utc>>> {
    s.map(|s| parse_ts(column, &s)).transpose()
}

pub(crate) fn parse_uuid(column: &str, s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| corrupt(column, e))
}

pub(crate) fn parse_enum<T>(column: &str, s: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| corrupt(column, e))
}

pub(crate) fn to_json<T: Serialize>(v: &T) -> Result<String> {
    Ok(serde_json::to_string(v)?)
}

pub(crate) fn from_json<T: DeserializeOwned>(column: &str, s: &str) -> Result<T> {
    serde_json::from_str(s).map_err(|e| corrupt(column, e))
}

/// An energy column read back from storage.
pub(crate) fn parse_energy(column: &str, v: Option<i64>) -> Result<Option<ob_domain::Energy>> {
    v.map(|v| ob_domain::Energy::try_from(v).map_err(|e| corrupt(column, e)))
        .transpose()
}

fn corrupt(column: &str, e: impl std::fmt::Display) -> Error {
    Error::Database(format!("corrupt value in column '{column}': {e}"))
}
