// ConfigStore Service
// Handles the application config document (single JSON file)

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::models::AppConfig;

const DEFAULT_CONFIG: &[u8] = b"{}";
const CONFIG_INDENT: &[u8] = b"    ";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to create config directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write config {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid JSON: {0}")]
    Invalid(serde_json::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}

impl ConfigError {
    /// Whether the error was caused by the submitted document rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConfigError::Invalid(_))
    }
}

/// Reads and writes the config document.
///
/// Writes overwrite the file in place.
pub struct ConfigStore {
    config_path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Raw file contents, creating a `{}` document on first access
    pub fn read_raw(&self) -> Result<Vec<u8>, ConfigError> {
        match std::fs::read(&self.config_path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
                // Another request may have created it while we waited
                if self.config_path.exists() {
                    return std::fs::read(&self.config_path).map_err(|source| ConfigError::Read {
                        path: self.config_path.clone(),
                        source,
                    });
                }

                self.ensure_parent_dir()?;
                std::fs::write(&self.config_path, DEFAULT_CONFIG).map_err(|source| {
                    ConfigError::Write {
                        path: self.config_path.clone(),
                        source,
                    }
                })?;
                log::info!("Created default config at {:?}", self.config_path);
                Ok(DEFAULT_CONFIG.to_vec())
            }
            Err(source) => Err(ConfigError::Read {
                path: self.config_path.clone(),
                source,
            }),
        }
    }

    /// Strict decode of a submitted document
    pub fn parse(data: &[u8]) -> Result<AppConfig, ConfigError> {
        serde_json::from_slice(data).map_err(ConfigError::Invalid)
    }

    /// Normalize and overwrite the config file
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let mut config = config.clone();
        config.normalize();

        let mut content = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut content,
            PrettyFormatter::with_indent(CONFIG_INDENT),
        );
        config
            .serialize(&mut serializer)
            .map_err(ConfigError::Serialize)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.ensure_parent_dir()?;
        std::fs::write(&self.config_path, content).map_err(|source| ConfigError::Write {
            path: self.config_path.clone(),
            source,
        })?;

        log::info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    fn ensure_parent_dir(&self) -> Result<(), ConfigError> {
        match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}
