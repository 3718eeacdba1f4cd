// Theme Repository Client
// Fetches the public theme index and individual theme documents

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::models::{RepositoryTheme, Theme, ThemesRepository};

pub const DEFAULT_THEME_REPOSITORY_URL: &str = "https://themes.pelagica.app/";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const INDEX_FILE: &str = "index.json";

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("invalid repository path: {0}")]
    Url(String),

    #[error("failed to reach theme repository: {0}")]
    Request(#[from] reqwest::Error),

    #[error("theme repository returned {0}")]
    Status(u16),

    #[error("theme '{0}' is not in the repository")]
    NotFound(String),
}

pub struct ThemeRepositoryClient {
    client: Client,
    base_url: String,
}

impl ThemeRepositoryClient {
    pub fn new(base_url: &str) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        // Keep exactly one trailing slash so relative paths join cleanly
        let base_url = format!("{}/", base_url.trim().trim_end_matches('/'));
        Ok(Self { client, base_url })
    }

    /// Resolve a repository-relative path against the base URL
    pub fn resolve(&self, path: &str) -> Result<String, RepositoryError> {
        let path = path.trim().trim_start_matches("./").trim_start_matches('/');
        if path.is_empty() || path.contains("..") || path.contains("://") {
            return Err(RepositoryError::Url(path.to_string()));
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    pub async fn fetch_index(&self) -> Result<ThemesRepository, RepositoryError> {
        let url = self.resolve(INDEX_FILE)?;
        log::debug!("Fetching theme repository index from {url}");
        self.get_json(&url).await
    }

    pub async fn fetch_theme(&self, entry: &RepositoryTheme) -> Result<Theme, RepositoryError> {
        let url = self.resolve(&entry.path)?;
        log::info!("Fetching repository theme '{}' from {url}", entry.id);
        self.get_json(&url).await
    }

    /// Look up `id` in the index and download its theme document
    pub async fn fetch_theme_by_id(&self, id: &str) -> Result<Theme, RepositoryError> {
        let index = self.fetch_index().await?;
        let entry = index
            .find(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        self.fetch_theme(entry).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, RepositoryError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RepositoryError::Status(response.status().as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_single_trailing_slash() {
        let client = ThemeRepositoryClient::new("https://themes.example.com").unwrap();
        assert_eq!(client.resolve("index.json").unwrap(), "https://themes.example.com/index.json");

        let client = ThemeRepositoryClient::new("https://themes.example.com//").unwrap();
        assert_eq!(client.resolve("index.json").unwrap(), "https://themes.example.com/index.json");
    }

    #[test]
    fn test_resolve_paths() {
        let client = ThemeRepositoryClient::new(DEFAULT_THEME_REPOSITORY_URL).unwrap();
        assert_eq!(
            client.resolve("themes/ocean.json").unwrap(),
            "https://themes.pelagica.app/themes/ocean.json"
        );
        assert_eq!(
            client.resolve("./themes/ocean.json").unwrap(),
            "https://themes.pelagica.app/themes/ocean.json"
        );
        assert!(client.resolve("../secret.json").is_err());
        assert!(client.resolve("https://elsewhere.example/x.json").is_err());
        assert!(client.resolve("").is_err());
    }
}
