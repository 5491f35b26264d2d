// linkshelf platform paths
// Resolves the per-user config and data directories on Windows, macOS and Linux.

use std::env;
use std::path::PathBuf;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const APP_DIR_UNIX: &str = "linkshelf";
#[cfg(any(target_os = "macos", target_os = "windows"))]
const APP_DIR_DESKTOP: &str = "Linkshelf";

fn home_dir() -> PathBuf {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .unwrap_or_else(|_| String::from("/tmp"));
    PathBuf::from(home)
}

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/linkshelf` or `~/.config/linkshelf`
/// - **macOS**: `~/Library/Application Support/Linkshelf`
/// - **Windows**: `%APPDATA%/Linkshelf`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_DESKTOP)
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join(APP_DIR_DESKTOP)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR_UNIX),
            Err(_) => home_dir().join(".config").join(APP_DIR_UNIX),
        }
    }
}

/// Returns the platform-specific data directory.
///
/// - **Linux**: `$XDG_DATA_HOME/linkshelf` or `~/.local/share/linkshelf`
/// - **macOS / Windows**: same as the config directory
pub fn get_data_dir() -> PathBuf {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        get_config_dir()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR_UNIX),
            Err(_) => home_dir().join(".local").join("share").join(APP_DIR_UNIX),
        }
    }
}
