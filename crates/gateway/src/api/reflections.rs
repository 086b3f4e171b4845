use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::Extension;
use ob_domain::trace::TraceEvent;
use ob_domain::{NewReflection, Reflection};
use serde::Deserialize;

use crate::api::auth::AuthUser;
use crate::api::error::{ApiError, ApiResult, ValidJson};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListReflectionsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub cursor: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/reflections
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_reflections(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListReflectionsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(q) = query.map_err(ApiError::from_query)?;
    let cursor = q.cursor.as_deref().filter(|c| !c.is_empty());
    let page = state.store.list_reflections(&user.id, q.limit, cursor)?;
    Ok(Json(serde_json::json!({
        "reflections": page.items,
        "nextCursor": page.next_cursor,
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/reflections
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn create_reflection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(input): ValidJson<NewReflection>,
) -> ApiResult<impl IntoResponse> {
    let reflection = Reflection::new(user.id.clone(), input);
    state.store.create_reflection(&reflection)?;

    TraceEvent::ReflectionLogged {
        user_id: user.id,
        reflection_id: reflection.id.to_string(),
        mood: reflection.mood.map(|m| m.as_str().to_owned()),
    }
    .emit();

    Ok((StatusCode::CREATED, Json(reflection)))
}
