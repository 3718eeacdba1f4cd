// Jellyfin Client Service
// Asks a Jellyfin server who the bearer of an access token is

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const TOKEN_HEADER: &str = "X-Emby-Token";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing access token")]
    MissingToken,

    #[error("missing Jellyfin server URL")]
    MissingServerUrl,

    #[error("invalid Jellyfin server URL: {0}")]
    InvalidServerUrl(String),

    #[error("failed to reach Jellyfin server: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Jellyfin server returned {0}")]
    Status(u16),

    #[error("unexpected response from Jellyfin server: {0}")]
    Decode(String),

    #[error("admin access required")]
    NotAdministrator,
}

/// Subset of the `/Users/Me` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub policy: Option<UserPolicy>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPolicy {
    #[serde(default)]
    pub is_administrator: bool,
}

impl JellyfinUser {
    pub fn is_administrator(&self) -> bool {
        self.policy
            .as_ref()
            .map(|policy| policy.is_administrator)
            .unwrap_or(false)
    }
}

/// HTTP client for the Jellyfin identity endpoints
#[derive(Clone)]
pub struct JellyfinClient {
    client: Client,
}

impl JellyfinClient {
    pub fn new() -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the user that owns `token` on `server_url`
    pub async fn current_user(&self, server_url: &str, token: &str) -> Result<JellyfinUser, AuthError> {
        let base = normalize_server_url(server_url)?;
        let response = self
            .client
            .get(format!("{base}/Users/Me"))
            .header(TOKEN_HEADER, token)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(AuthError::Status(response.status().as_u16()));
        }

        response
            .json::<JellyfinUser>()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Succeeds only when the token belongs to a server administrator
    pub async fn authorize_admin(&self, server_url: &str, token: &str) -> Result<JellyfinUser, AuthError> {
        let user = self.current_user(server_url, token).await?;
        if !user.is_administrator() {
            return Err(AuthError::NotAdministrator);
        }
        Ok(user)
    }
}

/// Trim whitespace and trailing slashes, and only allow http(s) URLs
pub fn normalize_server_url(server_url: &str) -> Result<String, AuthError> {
    let trimmed = server_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::MissingServerUrl);
    }

    let lower = trimmed.to_lowercase();
    let has_host = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"))
        .map(|rest| !rest.is_empty())
        .unwrap_or(false);
    if !has_host {
        return Err(AuthError::InvalidServerUrl(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Pull the access token out of an Authorization header value.
///
/// Accepts a raw token, `Bearer <token>`, or the Jellyfin
/// `MediaBrowser Client="..", Token="<token>"` form.
pub fn token_from_authorization(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // A bare scheme with the token stripped off carries no credential
    if value.eq_ignore_ascii_case("bearer") {
        return None;
    }
    if let Some((scheme, bearer)) = value.split_once(' ') {
        if scheme.eq_ignore_ascii_case("bearer") {
            let token = bearer.trim();
            return (!token.is_empty()).then(|| token.to_string());
        }
    }

    let lower = value.to_lowercase();
    if lower.starts_with("mediabrowser ") || lower.starts_with("emby ") {
        return value
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                // The scheme prefix sticks to the first key
                let part = part.rsplit(' ').next().unwrap_or(part);
                let (key, raw) = part.split_once('=')?;
                key.trim()
                    .eq_ignore_ascii_case("token")
                    .then(|| raw.trim().trim_matches('"').to_string())
            })
            .find(|token| !token.is_empty());
    }

    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(
            normalize_server_url(" https://jf.example.com/ ").unwrap(),
            "https://jf.example.com"
        );
        assert_eq!(
            normalize_server_url("http://10.0.0.2:8096").unwrap(),
            "http://10.0.0.2:8096"
        );
        assert!(matches!(normalize_server_url(""), Err(AuthError::MissingServerUrl)));
        assert!(matches!(
            normalize_server_url("ftp://jf.example.com"),
            Err(AuthError::InvalidServerUrl(_))
        ));
        assert!(matches!(
            normalize_server_url("https://"),
            Err(AuthError::InvalidServerUrl(_))
        ));
    }

    #[test]
    fn test_token_from_raw_and_bearer() {
        assert_eq!(token_from_authorization("abc123").as_deref(), Some("abc123"));
        assert_eq!(token_from_authorization("Bearer abc123").as_deref(), Some("abc123"));
        assert_eq!(token_from_authorization("Bearer   "), None);
        assert_eq!(token_from_authorization("bearer xyz").as_deref(), Some("xyz"));
        assert_eq!(token_from_authorization("BEARER"), None);
        assert_eq!(token_from_authorization("   "), None);
    }

    #[test]
    fn test_token_from_mediabrowser_header() {
        let header = r#"MediaBrowser Client="Pelagica", Device="Firefox", DeviceId="x1", Version="1.0", Token="tok-42""#;
        assert_eq!(token_from_authorization(header).as_deref(), Some("tok-42"));

        let without_token = r#"MediaBrowser Client="Pelagica", Device="Firefox""#;
        assert_eq!(token_from_authorization(without_token), None);
    }

    #[test]
    fn test_user_admin_flag() {
        let admin: JellyfinUser = serde_json::from_str(
            r#"{"Name":"root","Id":"1","Policy":{"IsAdministrator":true,"IsDisabled":false}}"#,
        )
        .unwrap();
        assert!(admin.is_administrator());

        let viewer: JellyfinUser =
            serde_json::from_str(r#"{"Name":"kid","Id":"2","Policy":{"IsAdministrator":false}}"#).unwrap();
        assert!(!viewer.is_administrator());

        let no_policy: JellyfinUser = serde_json::from_str(r#"{"Name":"guest"}"#).unwrap();
        assert!(!no_policy.is_administrator());
    }
}
