use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const GLOBAL_STATE_DIR: &str = ".argrecord";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const SETTINGS_PATH_ENV: &str = "ARGREPLAY_CONFIG";

pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(GLOBAL_STATE_DIR)
        .join(GLOBAL_SETTINGS_FILE_NAME))
}

/// Settings file to load: an explicit path, then `$ARGREPLAY_CONFIG`, then
/// the per-user default when it exists.
pub fn resolve_settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_settings_path().ok().filter(|path| path.is_file())
}
