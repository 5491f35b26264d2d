use serde::{Deserialize, Serialize};

use super::folder::FolderDeletePolicy;

/// Top-level service settings, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    /// SQLite file location. `None` means `<data dir>/linkshelf.db`.
    pub database_path: Option<String>,
    pub default_workspace_id: String,
    pub default_workspace_name: String,
    pub folder_delete_policy: FolderDeletePolicy,
    /// `tracing_subscriber::EnvFilter` directive used when `LINKSHELF_LOG` is unset.
    pub log_filter: String,
    pub rate_limit_per_second: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            default_workspace_id: "default".to_string(),
            default_workspace_name: "Default Workspace".to_string(),
            folder_delete_policy: FolderDeletePolicy::Shallow,
            log_filter: "info".to_string(),
            rate_limit_per_second: 200,
        }
    }
}
