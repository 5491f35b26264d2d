// linkshelf Settings Engine
// Loads, saves and updates service settings stored as a JSON file, and applies
// environment overrides on top of the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ServiceSettings;

/// Environment variable naming an explicit settings file.
pub const ENV_CONFIG_PATH: &str = "LINKSHELF_CONFIG";
/// Environment variable naming the directory holding `linkshelf.db`.
pub const ENV_DATA_DIR: &str = "LINKSHELF_DATA_DIR";

const DATABASE_FILE: &str = "linkshelf.db";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ServiceSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ServiceSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ServiceSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// Path precedence: `path_override`, then `$LINKSHELF_CONFIG`, then
    /// `settings.json` in the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override
            .or_else(|| env::var(ENV_CONFIG_PATH).ok())
            .unwrap_or_else(|| {
                platform::get_config_dir()
                    .join("settings.json")
                    .to_string_lossy()
                    .to_string()
            });

        Self {
            config_path,
            settings: ServiceSettings::default(),
        }
    }

    /// Builds an engine around already-known settings without touching disk.
    pub fn with_settings(config_path: &str, settings: ServiceSettings) -> Self {
        Self {
            config_path: config_path.to_string(),
            settings,
        }
    }

    /// Resolves where the database lives.
    ///
    /// An explicit `database_path` wins, then `$LINKSHELF_DATA_DIR`, then the
    /// platform data directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.settings.database_path {
            return PathBuf::from(path);
        }
        match env::var(ENV_DATA_DIR) {
            Ok(dir) => PathBuf::from(dir).join(DATABASE_FILE),
            Err(_) => platform::get_data_dir().join(DATABASE_FILE),
        }
    }

    fn validate(settings: &ServiceSettings) -> Result<(), SettingsError> {
        if settings.default_workspace_id.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "default_workspace_id cannot be empty".to_string(),
            ));
        }
        if settings.rate_limit_per_second == 0 {
            return Err(SettingsError::InvalidValue(
                "rate_limit_per_second must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults. Missing keys fall back to their defaults.
    fn load(&mut self) -> Result<ServiceSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            tracing::debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = ServiceSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: ServiceSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::validate(&settings)?;

        tracing::info!(path = %self.config_path, "loaded settings");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Updates one top-level setting and persists the result.
    ///
    /// The new value is validated by deserializing the whole settings object.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        match json_value.as_object_mut() {
            Some(map) if map.contains_key(key) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "Key '{}' not found in settings",
                    key
                )))
            }
        }

        let new_settings: ServiceSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        Self::validate(&new_settings)?;

        self.settings = new_settings;
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
