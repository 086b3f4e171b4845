use std::fmt;
use std::str::FromStr;

use ob_domain::error::Error;
use ob_domain::{Energy, Mode, TimeOfDay, Valence};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event that asks for a contextual message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    ModeChange,
    ReflectionLogged,
    EnergyLow,
    NoTask,
    ChatOpened,
}

impl Trigger {
    pub const ALL: [Trigger; 5] = [
        Trigger::ModeChange,
        Trigger::ReflectionLogged,
        Trigger::EnergyLow,
        Trigger::NoTask,
        Trigger::ChatOpened,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::ModeChange => "mode_change",
            Trigger::ReflectionLogged => "reflection_logged",
            Trigger::EnergyLow => "energy_low",
            Trigger::NoTask => "no_task",
            Trigger::ChatOpened => "chat_opened",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trigger::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid("trigger", format!("unknown trigger '{s}'")))
    }
}

/// Ambient user state sent alongside a trigger.
///
/// `mood` is free text: enumerated mood names and short phrases like
/// "pretty good" are both accepted. Fields this type does not know are kept
/// in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<Energy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    /// IANA timezone name used when `time_of_day` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageContext {
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Default::default()
        }
    }

    pub fn with_mood(mood: impl Into<String>) -> Self {
        Self {
            mood: Some(mood.into()),
            ..Default::default()
        }
    }

    pub fn with_time_of_day(time_of_day: TimeOfDay) -> Self {
        Self {
            time_of_day: Some(time_of_day),
            ..Default::default()
        }
    }
}

const POSITIVE_KEYWORDS: &[&str] = &["happy", "good", "great", "energized", "calm"];
const NEGATIVE_KEYWORDS: &[&str] = &["sad", "tired", "anxious", "frustrated"];

/// Bucket a free-text mood by keyword. Positive keywords win over negative
/// ones; anything unmatched (or no mood at all) is neutral.
pub fn mood_bucket(mood: Option<&str>) -> Valence {
    let Some(mood) = mood else {
        return Valence::Neutral;
    };
    let lower = mood.to_ascii_lowercase();
    if POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Valence::Positive
    } else if NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Valence::Negative
    } else {
        Valence::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_wire_names() {
        for t in Trigger::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<Trigger>().unwrap(), t);
        }
        assert!("lunch_break".parse::<Trigger>().is_err());
    }

    #[test]
    fn context_keeps_unknown_fields() {
        let ctx: MessageContext = serde_json::from_str(
            r#"{"mode":"flow","energyLevel":20,"streak":3,"source":"widget"}"#,
        )
        .unwrap();
        assert_eq!(ctx.mode, Some(Mode::Flow));
        assert_eq!(ctx.energy_level.map(Energy::value), Some(20));
        assert_eq!(ctx.extra.get("streak"), Some(&Value::from(3)));
        assert_eq!(ctx.extra.get("source"), Some(&Value::from("widget")));
    }

    #[test]
    fn context_rejects_out_of_range_energy() {
        assert!(serde_json::from_str::<MessageContext>(r#"{"energyLevel":150}"#).is_err());
    }

    #[test]
    fn mood_keywords() {
        assert_eq!(mood_bucket(Some("Feeling GREAT today")), Valence::Positive);
        assert_eq!(mood_bucket(Some("happy")), Valence::Positive);
        assert_eq!(mood_bucket(Some("a bit tired")), Valence::Negative);
        assert_eq!(mood_bucket(Some("anxious")), Valence::Negative);
        assert_eq!(mood_bucket(Some("meh")), Valence::Neutral);
        assert_eq!(mood_bucket(None), Valence::Neutral);
    }
}
