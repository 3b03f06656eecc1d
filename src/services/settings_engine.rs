// navdesk Settings Engine
// Reads and updates the site-wide display settings kept in settings.json.
// Reads fall back to defaults when the file does not exist yet.

use tracing::info;

use crate::storage::Repository;
use crate::types::errors::{NavError, ValidationReason};
use crate::types::settings::{Settings, SettingsUpdate, ThemeMode};
use crate::types::user::Actor;

/// Maximum site title length, in characters.
pub const MAX_SITE_TITLE_CHARS: usize = 50;

/// Inclusive bounds for each numeric layout field.
pub const CARD_WIDTH_RANGE: (i64, i64) = (120, 300);
pub const CARD_HEIGHT_RANGE: (i64, i64) = (60, 150);
pub const ICON_SIZE_RANGE: (i64, i64) = (24, 80);
pub const SIDEBAR_WIDTH_RANGE: (i64, i64) = (50, 600);

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn get_settings(&self) -> Result<Settings, NavError>;
    fn update_settings(&mut self, update: &SettingsUpdate, actor: &Actor) -> Result<Settings, NavError>;
    fn reset(&mut self, actor: &Actor) -> Result<Settings, NavError>;
}

/// Settings engine backed by the repository.
pub struct SettingsEngine<'a> {
    repo: &'a dyn Repository,
}

impl<'a> SettingsEngine<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }
}

fn check_range(field: &str, value: i64, (min, max): (i64, i64)) -> Result<(), NavError> {
    if value < min || value > max {
        return Err(ValidationReason::OutOfRange(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        ))
        .into());
    }
    Ok(())
}

/// Validates a raw update and converts it into a settings record.
///
/// The title is stored trimmed.
pub fn validate_update(update: &SettingsUpdate) -> Result<Settings, NavError> {
    let title = update.site_title.trim();
    if title.is_empty() || title.chars().count() > MAX_SITE_TITLE_CHARS {
        return Err(ValidationReason::OutOfRange(format!(
            "siteTitle must be 1 to {} characters",
            MAX_SITE_TITLE_CHARS
        ))
        .into());
    }
    check_range("cardWidth", update.card_width, CARD_WIDTH_RANGE)?;
    check_range("cardHeight", update.card_height, CARD_HEIGHT_RANGE)?;
    check_range("iconWidth", update.icon_width, ICON_SIZE_RANGE)?;
    check_range("iconHeight", update.icon_height, ICON_SIZE_RANGE)?;
    check_range("sidebarWidth", update.sidebar_width, SIDEBAR_WIDTH_RANGE)?;
    let theme = ThemeMode::parse(&update.theme).ok_or_else(|| {
        ValidationReason::OutOfRange(format!("theme must be auto, light or dark, got {:?}", update.theme))
    })?;

    Ok(Settings {
        site_title: title.to_string(),
        card_width: update.card_width,
        card_height: update.card_height,
        icon_width: update.icon_width,
        icon_height: update.icon_height,
        sidebar_width: update.sidebar_width,
        theme,
        updated_at: None,
    })
}

impl<'a> SettingsEngineTrait for SettingsEngine<'a> {
    fn get_settings(&self) -> Result<Settings, NavError> {
        Ok(self.repo.load_settings()?)
    }

    fn update_settings(&mut self, update: &SettingsUpdate, actor: &Actor) -> Result<Settings, NavError> {
        let settings = validate_update(update)?;
        let saved = self.repo.save_settings(&settings)?;
        info!(actor = %actor.username, title = %saved.site_title, "settings updated");
        Ok(saved)
    }

    /// Restores factory defaults and saves them.
    fn reset(&mut self, actor: &Actor) -> Result<Settings, NavError> {
        let saved = self.repo.save_settings(&Settings::default())?;
        info!(actor = %actor.username, "settings reset to defaults");
        Ok(saved)
    }
}
