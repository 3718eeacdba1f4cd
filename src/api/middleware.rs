use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::services::{token_from_authorization, AuthError};

const TOKEN_HEADER: &str = "x-emby-token";
const SERVER_URL_HEADER: &str = "x-jellyfin-url";

#[derive(Debug, Default, Deserialize)]
struct AuthQuery {
    jellyfin_url: Option<String>,
}

/// Extract the Jellyfin access token from the request headers
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_authorization)
        .or_else(|| {
            headers
                .get(TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
}

/// Jellyfin server URL from `?jellyfin_url=` or the `X-Jellyfin-Url` header
fn request_server_url(request: &Request) -> Option<String> {
    let from_query = Query::<AuthQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.jellyfin_url);

    from_query
        .or_else(|| {
            request
                .headers()
                .get(SERVER_URL_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Admin gate for mutating routes: the caller's Jellyfin token must belong
/// to an administrator of the Jellyfin server named in the request.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = match request_token(request.headers()) {
        Some(token) => token,
        None => return ApiError::from(AuthError::MissingToken).into_response(),
    };
    let server_url = match request_server_url(&request) {
        Some(url) => url,
        None => return ApiError::from(AuthError::MissingServerUrl).into_response(),
    };

    match state.jellyfin.authorize_admin(&server_url, &token).await {
        Ok(user) => {
            log::debug!("Authorized admin '{}' for {}", user.name, request.uri().path());
            next.run(request).await
        }
        Err(error) => ApiError::from(error).into_response(),
    }
}

/// Rate limiting middleware
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state.rate_limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_) => ApiError::TooManyRequests.into_response(),
    }
}

/// One access log line per request
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    let response = next.run(request).await;

    log::info!(
        "{} - {} {} ({:?}) - {}",
        response.status().as_u16(),
        method,
        path,
        started.elapsed(),
        client
    );
    response
}
