//! Lenient parsing of LLM replies.

use serde::de::DeserializeOwned;
use serde_json::Value;

pub const MAX_SUBTASKS: usize = 6;

/// Strip a surrounding Markdown code fence (```json ... ```), if any.
pub fn unwrap_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a JSON reply, tolerating code fences and prose around a single
/// object.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let body = unwrap_code_fence(text);
    if let Ok(v) = serde_json::from_str(body) {
        return Some(v);
    }
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

/// Extract subtask titles from a reply.
///
/// Accepts a JSON array of strings, an object with a `subtasks` array, or
/// plain numbered/bulleted lines. At most [`MAX_SUBTASKS`] are returned.
pub fn parse_subtasks(text: &str) -> Vec<String> {
    let body = unwrap_code_fence(text);

    let from_json = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => Some(items),
        Ok(Value::Object(mut obj)) => match obj.remove("subtasks") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    };

    let items: Vec<String> = match from_json {
        Some(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Object(o) => o.get("title").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect(),
        None => body.lines().map(strip_list_marker).map(String::from).collect(),
    };

    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_SUBTASKS)
        .collect()
}

/// Remove a leading "1.", "2)", "-", "*" or "•" list marker.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim();
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    line
}

/// Trim whitespace and one layer of surrounding quotes.
pub fn clean_quote(text: &str) -> String {
    let t = text.trim();
    let t = t
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| t.strip_prefix('“').and_then(|s| s.strip_suffix('”')))
        .unwrap_or(t);
    t.trim().to_string()
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}
