use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `GET /api/health`
///
/// Public liveness probe. Answers 503 when the database cannot be reached;
/// an offline assistant only degrades the report.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.store.ping() {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health: database ping failed");
            "unavailable"
        }
    };
    let llm = if state.assistant.is_online() {
        "online"
    } else {
        "offline"
    };
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "database": database,
            "llm": llm,
            "providers": state.llm.list_providers(),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
