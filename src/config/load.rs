use super::{load_defaults_file, resolve_settings_path, ConfigError, Settings};
use std::collections::BTreeMap;
use std::path::Path;

/// Loads and validates the settings file, or returns empty settings when no
/// file applies.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(path) = resolve_settings_path(explicit) else {
        return Ok(Settings::default());
    };
    let settings = Settings::from_path(&path)?;
    settings.validate()?;
    Ok(settings)
}

/// Default substitution variables: the settings file's `substitute` map with
/// the defaults file layered on top.
pub fn load_default_variables(
    settings: &Settings,
    defaults_file: Option<&Path>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut variables = settings.substitutions();
    let file = defaults_file.or(settings.defaults.as_deref());
    if let Some(path) = file {
        variables.extend(load_defaults_file(path)?);
    }
    Ok(variables)
}
