use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and which backend the stores run against.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer-api",
        "backend": state.backend,
    }))
}

/// GET /api/v1/session
pub async fn session_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "session_id": state.session,
        "backend": state.backend,
    }))
}
