//! App Core for linkshelf.
//!
//! Holds the database and the loaded settings, and provisions the default
//! workspace once at startup.

use std::path::Path;

use crate::database::connection::Database;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::folder_manager::FolderManager;
use crate::managers::tag_manager::TagManager;
use crate::managers::user_manager::UserManager;
use crate::managers::workspace_manager::{WorkspaceManager, WorkspaceManagerTrait};
use crate::types::errors::StoreResult;
use crate::types::settings::ServiceSettings;
use crate::types::workspace::Workspace;

/// Central application struct.
///
/// Managers borrow the connection with a lifetime, so they are created on
/// demand through the accessor methods instead of being stored.
pub struct App {
    pub db: Database,
    pub settings: ServiceSettings,
}

impl App {
    /// Opens the database at `db_path` and provisions the default workspace.
    pub fn new<P: AsRef<Path>>(db_path: P, settings: ServiceSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        Self::from_database(db, settings)
    }

    /// Same as [`App::new`] on a throwaway in-memory database.
    pub fn open_in_memory(settings: ServiceSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open_in_memory()?;
        Self::from_database(db, settings)
    }

    fn from_database(db: Database, settings: ServiceSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let app = Self { db, settings };
        let workspace = app.ensure_default_workspace()?;
        tracing::info!(workspace_id = %workspace.id, "default workspace ready");
        Ok(app)
    }

    /// Idempotently provisions the configured default workspace and its owner.
    pub fn ensure_default_workspace(&self) -> StoreResult<Workspace> {
        self.workspaces().ensure_workspace(
            &self.settings.default_workspace_id,
            &self.settings.default_workspace_name,
        )
    }

    pub fn default_workspace_id(&self) -> &str {
        &self.settings.default_workspace_id
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection())
    }

    /// Folder manager using the configured delete policy.
    pub fn folders(&self) -> FolderManager<'_> {
        FolderManager::with_policy(self.db.connection(), self.settings.folder_delete_policy)
    }

    pub fn tags(&self) -> TagManager<'_> {
        TagManager::new(self.db.connection())
    }

    pub fn users(&self) -> UserManager<'_> {
        UserManager::new(self.db.connection())
    }

    pub fn workspaces(&self) -> WorkspaceManager<'_> {
        WorkspaceManager::new(self.db.connection())
    }
}
