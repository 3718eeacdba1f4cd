// ThemeStore Service
// In-memory theme index backed by a directory of <id>.json files

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Theme, ThemeSummary};

const THEME_FILE_EXTENSION: &str = "json";
const TEMP_FILE_SUFFIX: &str = ".tmp";
const MAX_THEME_ID_LEN: usize = 128;
// Dot-separated runs of [A-Za-z0-9_-]: no leading, trailing or doubled dots
const THEME_ID_PATTERN: &str = r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$";
// Shadowed by the /api/themes/repository route
const RESERVED_THEME_IDS: [&str; 1] = ["repository"];

static THEME_ID_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Error, Debug)]
pub enum ThemeStoreError {
    #[error("Failed to initialize themes directory {dir:?}: {source}")]
    Init {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("theme not found: {0}")]
    NotFound(String),

    #[error("invalid theme id: {0}")]
    InvalidId(String),

    #[error("Failed to persist theme '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize theme: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// How theme files are written to disk.
///
/// `Direct` overwrites the target in a single write; a truncated file left by
/// a crash is skipped on the next startup. `AtomicRename` writes a sibling
/// temp file and renames it into place, which some bind mounts reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    #[default]
    Direct,
    AtomicRename,
}

impl FromStr for PersistMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "direct" => Ok(PersistMode::Direct),
            "atomic" | "rename" => Ok(PersistMode::AtomicRename),
            other => Err(format!("unknown theme write mode '{other}'")),
        }
    }
}

/// Validate a theme id before it becomes a file name
fn validate_theme_id(id: &str) -> Result<(), ThemeStoreError> {
    let id_regex = THEME_ID_REGEX.get_or_init(|| Regex::new(THEME_ID_PATTERN).unwrap());

    if id.len() > MAX_THEME_ID_LEN || !id_regex.is_match(id) || RESERVED_THEME_IDS.contains(&id) {
        return Err(ThemeStoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Owns the themes directory and an index of every theme in it.
///
/// Writes and deletes take the write lock for the whole operation, file I/O
/// included, and touch the index only after the filesystem change succeeded.
pub struct ThemeStore {
    themes_dir: PathBuf,
    persist_mode: PersistMode,
    themes: RwLock<HashMap<String, Theme>>,
}

impl ThemeStore {
    /// Create the directory if needed and load every `*.json` theme in it.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    pub fn open(themes_dir: impl Into<PathBuf>, persist_mode: PersistMode) -> Result<Self, ThemeStoreError> {
        let themes_dir = themes_dir.into();
        fs::create_dir_all(&themes_dir).map_err(|source| ThemeStoreError::Init {
            dir: themes_dir.clone(),
            source,
        })?;

        let themes = load_themes_from_dir(&themes_dir)?;
        log::info!(
            "ThemeStore: loaded {} theme(s) from {:?} (write mode: {:?})",
            themes.len(),
            themes_dir,
            persist_mode
        );

        Ok(Self {
            themes_dir,
            persist_mode,
            themes: RwLock::new(themes),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn len(&self) -> usize {
        self.read_index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_index().is_empty()
    }

    /// Summaries of every theme, sorted by id
    pub fn list(&self) -> Vec<ThemeSummary> {
        let themes = self.read_index();
        let mut summaries: Vec<ThemeSummary> = themes
            .iter()
            .map(|(id, theme)| theme.to_summary(id))
            .collect();
        drop(themes);

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub fn get(&self, id: &str) -> Result<Theme, ThemeStoreError> {
        self.read_index()
            .get(id)
            .cloned()
            .ok_or_else(|| ThemeStoreError::NotFound(id.to_string()))
    }

    /// Create or replace a theme. An empty id gets a fresh UUID.
    ///
    /// Returns the id the theme was stored under.
    pub fn write(&self, id: &str, theme: Theme) -> Result<String, ThemeStoreError> {
        if !id.is_empty() {
            validate_theme_id(id)?;
        }

        let content = serde_json::to_string_pretty(&theme)?;

        let mut themes = self.write_index();
        let id = if id.is_empty() {
            generate_unique_id(&themes)
        } else {
            id.to_string()
        };

        self.persist(&id, content.as_bytes())
            .map_err(|source| ThemeStoreError::Io {
                id: id.clone(),
                source,
            })?;

        themes.insert(id.clone(), theme);
        log::info!("Saved theme '{id}'");
        Ok(id)
    }

    /// Remove a theme and its file. The index entry survives a failed removal.
    pub fn delete(&self, id: &str) -> Result<(), ThemeStoreError> {
        let mut themes = self.write_index();
        if !themes.contains_key(id) {
            return Err(ThemeStoreError::NotFound(id.to_string()));
        }

        let path = self.theme_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Theme file {path:?} was already gone, dropping index entry");
            }
            Err(source) => {
                return Err(ThemeStoreError::Io {
                    id: id.to_string(),
                    source,
                });
            }
        }

        themes.remove(id);
        log::info!("Deleted theme '{id}'");
        Ok(())
    }

    fn theme_path(&self, id: &str) -> PathBuf {
        self.themes_dir.join(format!("{id}.{THEME_FILE_EXTENSION}"))
    }

    fn persist(&self, id: &str, content: &[u8]) -> io::Result<()> {
        let path = self.theme_path(id);
        match self.persist_mode {
            PersistMode::Direct => fs::write(&path, content),
            PersistMode::AtomicRename => {
                let tmp = self
                    .themes_dir
                    .join(format!("{id}.{THEME_FILE_EXTENSION}{TEMP_FILE_SUFFIX}"));
                let result = fs::write(&tmp, content).and_then(|_| fs::rename(&tmp, &path));
                if result.is_err() {
                    let _ = fs::remove_file(&tmp);
                }
                result
            }
        }
    }

    fn read_index(&self) -> RwLockReadGuard<'_, HashMap<String, Theme>> {
        // The index is only mutated after a completed file operation, so a
        // poisoned lock still guards a consistent map.
        self.themes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, HashMap<String, Theme>> {
        self.themes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn generate_unique_id(themes: &HashMap<String, Theme>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !themes.contains_key(&id) {
            return id;
        }
    }
}

fn load_themes_from_dir(dir: &Path) -> Result<HashMap<String, Theme>, ThemeStoreError> {
    let entries = fs::read_dir(dir).map_err(|source| ThemeStoreError::Init {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut themes = HashMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_theme_file(&path) {
            continue;
        }

        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping theme file with non UTF-8 name: {path:?}");
            continue;
        };
        if validate_theme_id(id).is_err() {
            log::warn!("Skipping theme file with unusable id: {path:?}");
            continue;
        }

        match load_theme_file(&path) {
            Ok(theme) => {
                log::debug!("Loaded theme '{id}' from {path:?}");
                themes.insert(id.to_string(), theme);
            }
            Err(error) => {
                log::warn!("Invalid theme file {:?}: {error}", path.file_name());
            }
        }
    }

    Ok(themes)
}

fn load_theme_file(path: &Path) -> Result<Theme, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read theme: {e}"))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid theme JSON: {e}"))
}

fn is_theme_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(THEME_FILE_EXTENSION)
}
