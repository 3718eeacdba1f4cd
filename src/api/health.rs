use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Readiness check - config file reachable and themes directory present
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut failed: Vec<&str> = Vec::new();

    if let Err(e) = state.config_store.read_raw() {
        log::warn!("Readiness: config unavailable: {e}");
        failed.push("config");
    }
    if !state.theme_store.dir().is_dir() {
        log::warn!("Readiness: themes directory {:?} missing", state.theme_store.dir());
        failed.push("themes");
    }

    if failed.is_empty() {
        Json(json!({ "ready": true, "themes": state.theme_store.len() })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ready": false, "failed": failed })),
        )
            .into_response()
    }
}
