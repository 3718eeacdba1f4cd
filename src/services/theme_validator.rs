// Theme validation
// Structural checks run before a theme is accepted from a client or the repository

use thiserror::Error;

use crate::models::{Theme, MODE_DARK, MODE_LIGHT};

/// Reason a theme was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,

    #[error("author is required")]
    MissingAuthor,

    #[error("description is required")]
    MissingDescription,

    #[error("version is required")]
    MissingVersion,

    #[error("at least one mode is required")]
    NoModes,

    #[error("invalid mode: {0}")]
    InvalidMode(String),

    #[error("light colors are required when light mode is specified")]
    MissingLightColors,

    #[error("dark colors are required when dark mode is specified")]
    MissingDarkColors,
}

/// Validate a theme, reporting the first failing check.
///
/// Checks run in a fixed order: metadata fields, then modes, then the color
/// set for each declared mode.
pub fn validate_theme(theme: &Theme) -> Result<(), ValidationError> {
    if theme.name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if theme.author.is_empty() {
        return Err(ValidationError::MissingAuthor);
    }
    if theme.description.is_empty() {
        return Err(ValidationError::MissingDescription);
    }
    if theme.version.is_empty() {
        return Err(ValidationError::MissingVersion);
    }
    if theme.modes.is_empty() {
        return Err(ValidationError::NoModes);
    }

    if let Some(invalid) = theme
        .modes
        .iter()
        .find(|mode| mode.as_str() != MODE_LIGHT && mode.as_str() != MODE_DARK)
    {
        return Err(ValidationError::InvalidMode(invalid.clone()));
    }

    if theme.has_mode(MODE_LIGHT) && theme.colors.light.is_empty() {
        return Err(ValidationError::MissingLightColors);
    }
    if theme.has_mode(MODE_DARK) && theme.colors.dark.is_empty() {
        return Err(ValidationError::MissingDarkColors);
    }

    Ok(())
}
