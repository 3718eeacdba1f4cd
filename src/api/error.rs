use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::{AuthError, ConfigError, RepositoryError, ThemeStoreError, ValidationError};

/// Error body returned for every non-2xx response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    TooManyRequests,
    BadGateway(String),
    /// Message is sent to the client as-is; details belong in the log
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::TooManyRequests => "Rate limit exceeded. Please try again later.".to_string(),
        }
    }

    /// Map a theme store failure, logging server-side details for 5xx cases
    pub fn from_store(error: ThemeStoreError, action: &str) -> Self {
        match error {
            ThemeStoreError::NotFound(_) => ApiError::NotFound("Theme not found".to_string()),
            ThemeStoreError::InvalidId(_) => ApiError::BadRequest(error.to_string()),
            ThemeStoreError::Init { .. } | ThemeStoreError::Io { .. } | ThemeStoreError::Serialize(_) => {
                log::error!("{action} failed: {error}");
                ApiError::Internal(format!("Failed to {action}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            ok: false,
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        log::warn!("Theme validation error: {error}");
        ApiError::BadRequest(format!("Theme validation error: {error}"))
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        if error.is_client_error() {
            log::warn!("Rejected config: {error}");
            return ApiError::BadRequest(error.to_string());
        }
        log::error!("Config I/O failed: {error}");
        ApiError::Internal("Failed to access config".to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        log::warn!("Authentication failed: {error}");
        ApiError::Forbidden(format!("Forbidden: {error}"))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => ApiError::NotFound(error.to_string()),
            _ => {
                log::error!("Theme repository request failed: {error}");
                ApiError::BadGateway("Theme repository unavailable".to_string())
            }
        }
    }
}
