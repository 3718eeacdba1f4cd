// AppConfig Model
// Settings document consumed by the web client (home screen, item pages, integrations)

use serde::{Deserialize, Serialize};

/// Application configuration
///
/// Every field is optional and omitted from the file when unset. Unknown keys
/// are rejected so typos in the admin editor surface as 400s instead of being
/// silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppConfig {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streamystats_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_streamystats_button: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_state_badge_home_screen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_state_badge_library: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_state_badge_genre: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_state_badge_search: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_theme_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_page: Option<ItemPageSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_screen_sections: Option<Vec<HomeScreenSection>>,
}

impl AppConfig {
    /// Turn absent item page lists into empty lists.
    ///
    /// An empty list is meaningful to the client ("show no favorite button"),
    /// while an absent one means "use the default", so once an item page block
    /// is saved its lists are always written out.
    pub fn normalize(&mut self) {
        if let Some(item_page) = self.item_page.as_mut() {
            item_page.favorite_button.get_or_insert_with(Vec::new);
            item_page.delete_button.get_or_insert_with(Vec::new);
            item_page.detail_badges.get_or_insert_with(Vec::new);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemPageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_badges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_button: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_button: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_watchlist_button: Option<bool>,
}

/// One home screen row. `type` selects which of the optional fields apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HomeScreenSection {
    #[serde(rename = "type")]
    pub section_type: String,

    // Common
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    // Media bar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SectionItemsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_favorite_button: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_watchlist_button: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    // Recently added / continue watching / next up / genres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    // Items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_fields: Option<Vec<String>>,

    // Continue watching / resume / next up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_line: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accurate_sorting: Option<bool>,

    // Streamystats recommendations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_based_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_similarity: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SectionItemsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unplayed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_in_kefin_tweaks_watchlist: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}
