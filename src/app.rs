//! App Core for navdesk.
//!
//! Central struct holding the configuration, the JSON store, the asset
//! manager and the session store.

use crate::config::NavdeskConfig;
use crate::managers::asset_manager::AssetManager;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::category_manager::CategoryManager;
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::services::identity::IdentityProvider;
use crate::services::settings_engine::SettingsEngine;
use crate::storage::JsonStore;
use crate::types::errors::{NavError, StorageError};
use crate::types::user::Actor;

/// Central application struct.
///
/// Category, bookmark, settings and identity services borrow the store and
/// are created on demand; none of them caches collection state.
pub struct App {
    pub config: NavdeskConfig,
    pub store: JsonStore,
    pub assets: AssetManager,
    pub sessions: SessionManager,
}

impl App {
    /// Creates the app and seeds the data directory if it is new.
    pub fn new(config: NavdeskConfig) -> Result<Self, StorageError> {
        let store = JsonStore::new(&config.data_root);
        store.init()?;
        let assets = AssetManager::new(&config);
        let sessions = SessionManager::new(config.session_ttl_days);
        Ok(Self {
            config,
            store,
            assets,
            sessions,
        })
    }

    pub fn categories(&self) -> CategoryManager<'_> {
        CategoryManager::new(&self.store, &self.assets)
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(&self.store, &self.assets)
    }

    pub fn settings(&self) -> SettingsEngine<'_> {
        SettingsEngine::new(&self.store)
    }

    pub fn identity(&self) -> IdentityProvider<'_> {
        IdentityProvider::new(&self.store)
    }

    /// Resolves a session token into the actor it belongs to.
    pub fn require_actor(&mut self, token: Option<&str>) -> Result<Actor, NavError> {
        token
            .and_then(|t| self.sessions.resolve(t))
            .map(|session| session.actor)
            .ok_or(NavError::Unauthorized)
    }
}
