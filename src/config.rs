// Server configuration
// Environment-driven settings resolved once at startup

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use log::LevelFilter;

use crate::services::{PersistMode, DEFAULT_THEME_REPOSITORY_URL};

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_THEMES_DIR: &str = "themes";
const DEFAULT_PORT: u16 = 4321;
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 300;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub config_path: PathBuf,
    pub themes_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub auth_enabled: bool,
    pub theme_write_mode: PersistMode,
    pub theme_repository_url: String,
    /// `None` disables the CORS layer, `Some(["*"])` allows any origin
    pub cors_origins: Option<Vec<String>>,
    pub rate_limit_per_minute: u32,
    pub ui_dir: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            themes_dir: PathBuf::from(DEFAULT_THEMES_DIR),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            auth_enabled: false,
            theme_write_mode: PersistMode::Direct,
            theme_repository_url: DEFAULT_THEME_REPOSITORY_URL.to_string(),
            cors_origins: None,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            ui_dir: None,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    ///
    /// Unparseable values fall back to the default; the problems are returned
    /// by [`ServerConfig::warnings`] so they can be logged once a logger exists.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            config_path: var("CONFIG_PATH").map(PathBuf::from).unwrap_or(defaults.config_path),
            themes_dir: var("THEMES_DIR").map(PathBuf::from).unwrap_or(defaults.themes_dir),
            host: var("HOST").and_then(|v| v.parse().ok()).unwrap_or(defaults.host),
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
            auth_enabled: var("ENABLE_AUTH")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            theme_write_mode: var("THEME_WRITE_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.theme_write_mode),
            theme_repository_url: var("THEME_REPOSITORY_URL").unwrap_or(defaults.theme_repository_url),
            cors_origins: var("CORS_ORIGINS").map(|v| parse_origins(&v)),
            rate_limit_per_minute: var("RATE_LIMIT_PER_MINUTE")
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.rate_limit_per_minute),
            ui_dir: var("UI_DIR").map(PathBuf::from),
            log_level: var("LOG_LEVEL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_level),
            log_file: var("LOG_FILE").map(PathBuf::from),
        }
    }

    /// Describe environment values that were present but ignored
    pub fn warnings<F>(lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let checks: [(&str, fn(&str) -> bool); 5] = [
            ("PORT", |v| v.parse::<u16>().is_ok()),
            ("HOST", |v| v.parse::<IpAddr>().is_ok()),
            ("THEME_WRITE_MODE", |v| v.parse::<PersistMode>().is_ok()),
            ("RATE_LIMIT_PER_MINUTE", |v| v.parse::<u32>().map(|n| n > 0).unwrap_or(false)),
            ("LOG_LEVEL", |v| v.parse::<LevelFilter>().is_ok()),
        ];

        checks
            .iter()
            .filter_map(|(key, valid)| {
                let value = lookup(key)?.trim().to_string();
                (!value.is_empty() && !valid(&value))
                    .then(|| format!("Ignoring invalid {key}={value:?}, using default"))
            })
            .collect()
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.config_path, PathBuf::from("config.json"));
        assert_eq!(config.themes_dir, PathBuf::from("themes"));
        assert_eq!(config.port, 4321);
        assert!(!config.auth_enabled);
        assert_eq!(config.theme_write_mode, PersistMode::Direct);
        assert!(config.cors_origins.is_none());
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_enable_auth_is_case_insensitive_true_only() {
        for value in ["true", "TRUE", " True "] {
            let config = ServerConfig::from_lookup(lookup_from(&[("ENABLE_AUTH", value)]));
            assert!(config.auth_enabled, "{value:?} should enable auth");
        }
        for value in ["1", "yes", "on", "false", ""] {
            let config = ServerConfig::from_lookup(lookup_from(&[("ENABLE_AUTH", value)]));
            assert!(!config.auth_enabled, "{value:?} should not enable auth");
        }
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("CONFIG_PATH", "/data/config.json"),
            ("THEMES_DIR", "/data/themes"),
            ("PORT", "8080"),
            ("THEME_WRITE_MODE", "atomic"),
            ("CORS_ORIGINS", "http://localhost:5173/, https://pelagica.example.com"),
            ("LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.config_path, PathBuf::from("/data/config.json"));
        assert_eq!(config.themes_dir, PathBuf::from("/data/themes"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.theme_write_mode, PersistMode::AtomicRename);
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "http://localhost:5173".to_string(),
                "https://pelagica.example.com".to_string()
            ])
        );
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_values_fall_back_and_warn() {
        let pairs = [("PORT", "not-a-port"), ("RATE_LIMIT_PER_MINUTE", "0")];
        let config = ServerConfig::from_lookup(lookup_from(&pairs));
        assert_eq!(config.port, 4321);
        assert_eq!(config.rate_limit_per_minute, 300);

        let warnings = ServerConfig::warnings(lookup_from(&pairs));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("PORT"));
    }
}
