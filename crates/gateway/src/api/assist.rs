//! AI-assisted helpers: task breakdown, reframing and quotes.
//!
//! These endpoints always answer 200 for valid input. When no provider is
//! configured, or the provider fails, the assistant serves fixed content.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use ob_assistant::Reframe;
use ob_domain::error::FieldError;
use ob_domain::validate::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use ob_domain::{Mode, Mood, Validate};
use serde::Deserialize;

use crate::api::error::ValidJson;
use crate::state::AppState;

fn check_title(title: &str, out: &mut Vec<FieldError>) {
    let len = title.trim().chars().count();
    if len == 0 {
        out.push(FieldError::new("title", "must not be empty"));
    } else if len > MAX_TITLE_CHARS {
        out.push(FieldError::new(
            "title",
            format!("must be at most {MAX_TITLE_CHARS} characters"),
        ));
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/tasks/subtasks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct SubtasksRequest {
    pub title: String,
}

impl Validate for SubtasksRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut out = Vec::new();
        check_title(&self.title, &mut out);
        out
    }
}

pub async fn subtasks(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SubtasksRequest>,
) -> impl IntoResponse {
    let subtasks = state.assistant.task_breakdown(req.title.trim()).await;
    Json(serde_json::json!({ "subtasks": subtasks }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/tasks/reframe
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ReframeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub mode: Mode,
    pub mood: Mood,
}

impl Validate for ReframeRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut out = Vec::new();
        check_title(&self.title, &mut out);
        if let Some(ref d) = self.description {
            if d.chars().count() > MAX_DESCRIPTION_CHARS {
                out.push(FieldError::new(
                    "description",
                    format!("must be at most {MAX_DESCRIPTION_CHARS} characters"),
                ));
            }
        }
        out
    }
}

pub async fn reframe(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ReframeRequest>,
) -> Json<Reframe> {
    Json(
        state
            .assistant
            .reframe_task(
                req.title.trim(),
                req.description.as_deref(),
                req.mode,
                req.mood,
            )
            .await,
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/quotes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub mode: Mode,
    pub mood: Mood,
}

impl Validate for QuoteRequest {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

pub async fn quote(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<QuoteRequest>,
) -> impl IntoResponse {
    let quote = state.assistant.motivational_quote(req.mode, req.mood).await;
    Json(serde_json::json!({ "quote": quote }))
}
