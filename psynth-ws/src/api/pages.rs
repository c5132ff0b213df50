//! Plain HTML pages

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

use crate::AppState;

/// GET /edit/:session_id
///
/// Post-commit confirmation page. Answers for the session in progress or the
/// most recently created one; anything else is not found.
pub async fn edit_page(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> Response {
    if state.registry.is_known_session(session_id).await {
        Html(format!(
            "<h3>Your synth {} has been exported as a zip file.</h3>",
            session_id
        ))
        .into_response()
    } else {
        not_found()
    }
}

/// Catch-all for unrecognized paths
pub async fn fallback() -> Response {
    not_found()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
