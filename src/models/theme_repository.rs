use serde::{Deserialize, Serialize};

/// Entry in the public theme repository index (`index.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTheme {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    pub author: String,
    /// Theme document location, relative to the repository base URL
    pub path: String,
    #[serde(default)]
    pub previews: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemesRepository {
    #[serde(default)]
    pub themes: Vec<RepositoryTheme>,
}

impl ThemesRepository {
    pub fn find(&self, id: &str) -> Option<&RepositoryTheme> {
        self.themes.iter().find(|theme| theme.id == id)
    }
}
