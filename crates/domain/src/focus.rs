use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::{Energy, Mode};

/// A timed stretch spent in one mode. Open while `ended_at` is `None`; a
/// user has at most one open session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: Uuid,
    pub user_id: String,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_energy: Option<Energy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_energy: Option<Energy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
}

impl FocusSession {
    pub fn start(
        user_id: impl Into<String>,
        mode: Mode,
        start_energy: Option<Energy>,
        task_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            mode,
            started_at: Utc::now(),
            ended_at: None,
            start_energy,
            end_energy: None,
            task_id,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Elapsed time of a closed session.
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_session_has_no_duration() {
        let s = FocusSession::start("u1", Mode::Flow, None, None);
        assert!(s.is_open());
        assert!(s.duration().is_none());
    }

    #[test]
    fn closed_session_duration() {
        let mut s = FocusSession::start("u1", Mode::Build, Energy::new(70).ok(), None);
        s.ended_at = Some(s.started_at + Duration::minutes(25));
        assert!(!s.is_open());
        assert_eq!(s.duration(), Some(Duration::minutes(25)));
    }
}
