use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::models::{Theme, ThemeSummary, ThemesRepository};
use crate::services::validate_theme;

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeIdResponse {
    pub id: String,
}

fn decode_theme(body: &[u8]) -> Result<Theme, ApiError> {
    let theme = Theme::from_request(body).map_err(|e| {
        log::warn!("Error decoding theme: {e}");
        ApiError::BadRequest(format!("Invalid JSON: {e}"))
    })?;
    validate_theme(&theme)?;
    Ok(theme)
}

/// GET /api/themes
pub async fn list_themes(State(state): State<AppState>) -> Json<Vec<ThemeSummary>> {
    Json(state.theme_store.list())
}

/// GET /api/themes/:id
pub async fn get_theme(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Theme>, ApiError> {
    state
        .theme_store
        .get(&id)
        .map(Json)
        .map_err(|e| ApiError::from_store(e, "load theme"))
}

/// POST /api/themes - store under a generated id
pub async fn create_theme(State(state): State<AppState>, body: Bytes) -> Result<Json<ThemeIdResponse>, ApiError> {
    let theme = decode_theme(&body)?;
    let id = state
        .theme_store
        .write("", theme)
        .map_err(|e| ApiError::from_store(e, "save theme"))?;
    Ok(Json(ThemeIdResponse { id }))
}

/// PUT /api/themes/:id - create or replace
pub async fn update_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let theme = decode_theme(&body)?;
    state
        .theme_store
        .write(&id, theme)
        .map_err(|e| ApiError::from_store(e, "save theme"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/themes/:id
pub async fn delete_theme(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state
        .theme_store
        .delete(&id)
        .map_err(|e| ApiError::from_store(e, "delete theme"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/themes/repository - proxy of the public repository index
pub async fn repository_index(State(state): State<AppState>) -> Result<Json<ThemesRepository>, ApiError> {
    Ok(Json(state.theme_repository.fetch_index().await?))
}

/// POST /api/themes/repository/:id/install - download, validate and store a repository theme
pub async fn install_repository_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThemeIdResponse>, ApiError> {
    let theme = state.theme_repository.fetch_theme_by_id(&id).await?;
    validate_theme(&theme)?;

    let id = state
        .theme_store
        .write(&id, theme)
        .map_err(|e| ApiError::from_store(e, "install theme"))?;
    log::info!("Installed repository theme '{id}'");
    Ok(Json(ThemeIdResponse { id }))
}
