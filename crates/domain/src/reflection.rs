use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::Mood;

/// Whether writing the reflection helped the user see more clearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarityGained {
    Yes,
    No,
    Unsure,
}

impl ClarityGained {
    pub fn as_str(self) -> &'static str {
        match self {
            ClarityGained::Yes => "yes",
            ClarityGained::No => "no",
            ClarityGained::Unsure => "unsure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(ClarityGained::Yes),
            "no" => Some(ClarityGained::No),
            "unsure" => Some(ClarityGained::Unsure),
            _ => None,
        }
    }
}

/// A journal entry about the user's day. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub wins: String,
    pub struggles: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// 0–100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_load: Option<u8>,
    /// 1–5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity_gained: Option<ClarityGained>,
    #[serde(default)]
    pub grounding_strategies: Vec<String>,
}

impl Reflection {
    pub fn new(user_id: impl Into<String>, input: NewReflection) -> Self {
        Self {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            user_id: user_id.into(),
            created_at: Utc::now(),
            wins: input.wins,
            struggles: input.struggles,
            journal: input.journal,
            mood: input.mood,
            tags: input.tags,
            emotion: input.emotion,
            cognitive_load: input.cognitive_load,
            control_rating: input.control_rating,
            clarity_gained: input.clarity_gained,
            grounding_strategies: input.grounding_strategies,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReflection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub wins: String,
    #[serde(default, alias = "challenges")]
    pub struggles: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_load: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity_gained: Option<ClarityGained>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_strategies: Vec<String>,
}
