pub mod assist;
pub mod auth;
pub mod contextual;
pub mod error;
pub mod health;
pub mod messages;
pub mod reflections;
pub mod sessions;
pub mod tasks;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the bearer-token middleware, which resolves the caller
/// into an [`auth::AuthUser`] extension).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/api/health", get(health::health));

    let protected = Router::new()
        // Tasks
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/subtasks", post(assist::subtasks))
        .route("/api/tasks/reframe", post(assist::reframe))
        .route(
            "/api/tasks/:id",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // Reflections
        .route(
            "/api/reflections",
            get(reflections::list_reflections).post(reflections::create_reflection),
        )
        // Messaging and chat
        .route("/api/contextual-message", post(contextual::contextual_message))
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/api/quotes", post(assist::quote))
        // Focus sessions
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::start_session),
        )
        .route("/api/sessions/active", get(sessions::active_session))
        .route("/api/sessions/end", post(sessions::end_session))
        .route_layer(middleware::from_fn_with_state(state, auth::require_user));

    public.merge(protected).layer(TraceLayer::new_for_http())
}
