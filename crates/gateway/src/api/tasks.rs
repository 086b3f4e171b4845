//! Task CRUD.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::Extension;
use ob_domain::trace::TraceEvent;
use ob_domain::{NewTask, Task, TaskPatch};
use ob_store::TaskFilter;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::error::{ApiError, ApiResult, ValidJson};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/tasks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    filter: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(filter) = filter.map_err(ApiError::from_query)?;
    let tasks = state.store.list_tasks(&user.id, &filter)?;
    let total = tasks.len();
    Ok(Json(serde_json::json!({
        "tasks": tasks,
        "total": total,
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/tasks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(input): ValidJson<NewTask>,
) -> ApiResult<impl IntoResponse> {
    let task = Task::new(user.id.clone(), input);
    if let Some(stored) = state.store.create_task(&task)? {
        tracing::debug!(task_id = %stored.id, "repeated create, returning stored task");
        return Ok((StatusCode::OK, Json(stored)));
    }

    TraceEvent::TaskCreated {
        user_id: user.id,
        task_id: task.id.to_string(),
        ai_generated: task.ai_generated,
    }
    .emit();

    Ok((StatusCode::CREATED, Json(task)))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/tasks/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    state
        .store
        .get_task(&user.id, id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("task"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PATCH /api/tasks/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ValidJson(patch): ValidJson<TaskPatch>,
) -> ApiResult<Json<Task>> {
    let task = state
        .store
        .update_task(&user.id, id, &patch)?
        .ok_or_else(|| ApiError::not_found("task"))?;

    TraceEvent::TaskUpdated {
        user_id: user.id,
        task_id: task.id.to_string(),
        status: task.status.as_str().to_owned(),
    }
    .emit();

    Ok(Json(task))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /api/tasks/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.store.delete_task(&user.id, id)? {
        return Err(ApiError::not_found("task"));
    }
    TraceEvent::TaskDeleted {
        user_id: user.id,
        task_id: id.to_string(),
    }
    .emit();
    Ok(Json(serde_json::json!({ "deleted": true })))
}
