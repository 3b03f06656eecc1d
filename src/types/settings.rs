use serde::{Deserialize, Serialize};

use super::timestamp::{self, Timestamp};

/// Site-wide display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub site_title: String,
    pub card_width: i64,
    pub card_height: i64,
    pub icon_width: i64,
    pub icon_height: i64,
    pub sidebar_width: i64,
    pub theme: ThemeMode,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::rfc3339_opt")]
    pub updated_at: Option<Timestamp>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_title: "极简网站导航".to_string(),
            card_width: 180,
            card_height: 80,
            icon_width: 50,
            icon_height: 50,
            sidebar_width: 300,
            theme: ThemeMode::Auto,
            updated_at: None,
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Parses the wire name (`auto`, `light`, `dark`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(ThemeMode::Auto),
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

/// Raw settings update as submitted by an admin, before range validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub site_title: String,
    #[serde(default)]
    pub card_width: i64,
    #[serde(default)]
    pub card_height: i64,
    #[serde(default)]
    pub icon_width: i64,
    #[serde(default)]
    pub icon_height: i64,
    #[serde(default)]
    pub sidebar_width: i64,
    #[serde(default)]
    pub theme: String,
}
