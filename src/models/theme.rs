use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const MODE_LIGHT: &str = "light";
pub const MODE_DARK: &str = "dark";

const THEME_FIELDS: &[&str] = &["name", "author", "description", "version", "colors", "radius", "modes"];
const COLOR_FIELDS: &[&str] = &[MODE_LIGHT, MODE_DARK];

// Color tokens for each mode, e.g. "background" -> "#0f0f10"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(default, deserialize_with = "null_as_default")]
    pub light: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dark: BTreeMap<String, String>,
}

/// A named color/appearance preset as stored in `<id>.json`.
///
/// Missing or `null` fields decode to empty values so that the validator,
/// not the decoder, reports what is required. Unknown fields are tolerated
/// here; submitted themes go through [`Theme::from_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: ThemeColors,
    #[serde(default, deserialize_with = "null_as_default")]
    pub radius: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modes: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn reject_unknown_fields(fields: &Map<String, Value>, known: &'static [&'static str]) -> Result<(), serde_json::Error> {
    match fields.keys().find(|key| !known.contains(&key.as_str())) {
        Some(field) => Err(<serde_json::Error as de::Error>::unknown_field(field, known)),
        None => Ok(()),
    }
}

impl Theme {
    /// Strict decode of a submitted theme: unknown fields are rejected at
    /// the top level and inside `colors`.
    pub fn from_request(data: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(data)?;
        if let Value::Object(fields) = &value {
            reject_unknown_fields(fields, THEME_FIELDS)?;
            if let Some(Value::Object(colors)) = fields.get("colors") {
                reject_unknown_fields(colors, COLOR_FIELDS)?;
            }
        }
        serde_json::from_value(value)
    }

    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.iter().any(|m| m == mode)
    }

    pub fn to_summary(&self, id: &str) -> ThemeSummary {
        ThemeSummary {
            id: id.to_string(),
            name: self.name.clone(),
            version: self.version.clone(),
            author: self.author.clone(),
        }
    }
}

// Theme summary for list display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
}
