//! Ambient session vocabulary: mode, mood, energy and time of day.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mode
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Top-level work context selected by the user.
///
/// `recover` and `reflect` are older spellings of [`Mode::Restore`] and are
/// accepted on input only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Build,
    Flow,
    #[serde(alias = "recover", alias = "reflect")]
    Restore,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Build, Mode::Flow, Mode::Restore];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Build => "build",
            Mode::Flow => "flow",
            Mode::Restore => "restore",
        }
    }

    /// Short description used when building LLM prompts.
    pub fn describe(self) -> &'static str {
        match self {
            Mode::Build => "focused on productive, structured work and getting things done",
            Mode::Flow => "in a creative, exploratory state following their curiosity",
            Mode::Restore => "prioritising rest, recovery and gentle self-care",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(Mode::Build),
            "flow" => Ok(Mode::Flow),
            "restore" | "recover" | "reflect" => Ok(Mode::Restore),
            other => Err(Error::invalid("mode", format!("unknown mode '{other}'"))),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mood
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Coarse emotional direction of a mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Valence {
    Positive,
    Neutral,
    Negative,
}

/// User-reported affective state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Energized,
    Happy,
    Calm,
    #[default]
    Neutral,
    Tired,
    Anxious,
    Sad,
    Frustrated,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Energized => "energized",
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Neutral => "neutral",
            Mood::Tired => "tired",
            Mood::Anxious => "anxious",
            Mood::Sad => "sad",
            Mood::Frustrated => "frustrated",
        }
    }

    pub fn valence(self) -> Valence {
        match self {
            Mood::Energized | Mood::Happy | Mood::Calm => Valence::Positive,
            Mood::Neutral => Valence::Neutral,
            Mood::Tired | Mood::Anxious | Mood::Sad | Mood::Frustrated => Valence::Negative,
        }
    }

    /// Short description used when building LLM prompts.
    pub fn describe(self) -> &'static str {
        match self.valence() {
            Valence::Positive => "feeling good and has momentum",
            Valence::Neutral => "feeling steady",
            Valence::Negative => "having a harder time and could use gentleness",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "energized" => Ok(Mood::Energized),
            "happy" => Ok(Mood::Happy),
            "calm" => Ok(Mood::Calm),
            "neutral" => Ok(Mood::Neutral),
            "tired" => Ok(Mood::Tired),
            "anxious" => Ok(Mood::Anxious),
            "sad" => Ok(Mood::Sad),
            "frustrated" => Ok(Mood::Frustrated),
            other => Err(Error::invalid("mood", format!("unknown mood '{other}'"))),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Energy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Self-reported energy on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Energy(u8);

impl Energy {
    pub const MAX: u8 = 100;
    /// Readings strictly below this are considered low.
    pub const LOW_THRESHOLD: u8 = 30;

    pub fn new(value: u8) -> Result<Self, Error> {
        if value > Self::MAX {
            return Err(Error::invalid(
                "energy",
                format!("energy must be between 0 and 100, got {value}"),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_low(self) -> bool {
        self.is_below(Self::LOW_THRESHOLD)
    }

    pub fn is_below(self, threshold: u8) -> bool {
        self.0 < threshold
    }

    /// Short description used when building LLM prompts.
    pub fn describe(self) -> &'static str {
        match self.0 {
            0..=29 => "low energy",
            30..=69 => "moderate energy",
            _ => "high energy",
        }
    }
}

impl Default for Energy {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<i64> for Energy {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or_else(|| format!("energy must be between 0 and 100, got {value}"))
    }
}

impl From<Energy> for u8 {
    fn from(e: Energy) -> u8 {
        e.0
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Time of day
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket a 24h clock hour: before 12 morning, before 17 afternoon,
    /// before 21 evening, otherwise night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            "night" => Ok(TimeOfDay::Night),
            other => Err(Error::invalid(
                "timeOfDay",
                format!("unknown time of day '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_mode_spellings_map_to_restore() {
        let m: Mode = serde_json::from_str(r#""recover""#).unwrap();
        assert_eq!(m, Mode::Restore);
        let m: Mode = serde_json::from_str(r#""reflect""#).unwrap();
        assert_eq!(m, Mode::Restore);
        assert_eq!("Recover".parse::<Mode>().unwrap(), Mode::Restore);
        assert_eq!(serde_json::to_string(&Mode::Restore).unwrap(), r#""restore""#);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!("sprint".parse::<Mode>().is_err());
        assert!(serde_json::from_str::<Mode>(r#""sprint""#).is_err());
    }

    #[test]
    fn energy_bounds() {
        assert!(Energy::new(100).is_ok());
        assert!(Energy::new(101).is_err());
        assert!(serde_json::from_str::<Energy>("-1").is_err());
        assert!(serde_json::from_str::<Energy>("250").is_err());
        let e: Energy = serde_json::from_str("42").unwrap();
        assert_eq!(e.value(), 42);
        assert_eq!(serde_json::to_string(&e).unwrap(), "42");
    }

    #[test]
    fn energy_low_threshold() {
        assert!(Energy::new(29).unwrap().is_low());
        assert!(!Energy::new(30).unwrap().is_low());
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
    }

    #[test]
    fn mood_valence() {
        assert_eq!(Mood::Happy.valence(), Valence::Positive);
        assert_eq!(Mood::Neutral.valence(), Valence::Neutral);
        assert_eq!(Mood::Anxious.valence(), Valence::Negative);
    }
}
