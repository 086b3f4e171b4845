use axum::extract::State;
use axum::response::Json;
use ob_messaging::{ContextualMessageRequest, ContextualMessageResponse};

use crate::api::error::ValidJson;
use crate::state::AppState;

/// `POST /api/contextual-message`
///
/// Always succeeds for a well-formed request: every trigger has copy.
pub async fn contextual_message(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ContextualMessageRequest>,
) -> Json<ContextualMessageResponse> {
    Json(state.messages.handle(&req))
}
