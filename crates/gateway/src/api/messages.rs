//! Chat transcript and chat turns with the assistant.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json};
use axum::Extension;
use ob_assistant::{ChatContext, TaskSummary};
use ob_domain::error::FieldError;
use ob_domain::{ChatMessage, Energy, Mode, Mood, Validate};
use ob_store::TaskFilter;
use serde::Deserialize;

use crate::api::auth::AuthUser;
use crate::api::error::{ApiError, ApiResult, ValidJson};
use crate::state::AppState;

const DEFAULT_HISTORY: usize = 50;
const MAX_HISTORY: usize = 200;
const MAX_MESSAGE_CHARS: usize = 4_000;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub message: String,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub energy: Option<Energy>,
    /// When absent the user's stored tasks are used.
    #[serde(default)]
    pub tasks: Option<Vec<TaskSummary>>,
}

impl Validate for ChatTurnRequest {
    fn validate(&self) -> Vec<FieldError> {
        let len = self.message.trim().chars().count();
        if len == 0 {
            vec![FieldError::new("message", "must not be empty")]
        } else if len > MAX_MESSAGE_CHARS {
            vec![FieldError::new(
                "message",
                format!("must be at most {MAX_MESSAGE_CHARS} characters"),
            )]
        } else {
            Vec::new()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(q) = query.map_err(ApiError::from_query)?;
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY).clamp(1, MAX_HISTORY);
    let messages = state.store.recent_messages(&user.id, limit)?;
    Ok(Json(serde_json::json!({ "messages": messages })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One chat turn. The user message and the reply are both appended to the
/// transcript; the assistant never fails the request.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(turn): ValidJson<ChatTurnRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = turn.message.trim().to_owned();
    state
        .store
        .append_message(&user.id, &ChatMessage::user(text.clone()))?;

    let tasks = match turn.tasks {
        Some(tasks) => tasks,
        None => state
            .store
            .list_tasks(&user.id, &TaskFilter::default())?
            .iter()
            .map(TaskSummary::from)
            .collect(),
    };
    let ctx = ChatContext {
        mode: turn.mode,
        mood: turn.mood,
        energy: turn.energy,
        tasks,
    };

    let reply = state.assistant.chat_response(&text, &ctx).await;
    let assistant_message = ChatMessage::assistant(reply.chat_response);
    state.store.append_message(&user.id, &assistant_message)?;

    Ok(Json(serde_json::json!({
        "assistantMessage": assistant_message,
        "suggestedTasks": reply.suggested_tasks,
    })))
}
