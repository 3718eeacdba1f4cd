use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::{ApiError, AppState};
use crate::services::ConfigStore;

/// GET /api/config - file contents as stored, `{}` on first access
pub async fn get_config(State(state): State<AppState>) -> Result<Response, ApiError> {
    let data = state.config_store.read_raw()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], data).into_response())
}

/// POST|PUT /api/config - strict decode, normalize and overwrite
pub async fn update_config(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let config = ConfigStore::parse(&body)?;
    state.config_store.save(&config)?;
    Ok(StatusCode::NO_CONTENT)
}
