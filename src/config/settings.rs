use super::ConfigError;
use crate::shared::VariableName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound accepted for `verbosity`.
pub const MAX_VERBOSITY: u8 = 3;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub verbosity: Option<u8>,
    /// Defaults file used when `--defaults` is not given.
    pub defaults: Option<PathBuf>,
    #[serde(default)]
    pub substitute: BTreeMap<VariableName, String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut settings: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        settings.resolve_relative_paths(path.parent());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(verbosity) = self.verbosity {
            if verbosity > MAX_VERBOSITY {
                return Err(ConfigError::Settings(format!(
                    "`verbosity` must be between 0 and {MAX_VERBOSITY}"
                )));
            }
        }
        if let Some(path) = &self.log_file {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Settings(
                    "`log_file` must be a non-empty path".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn substitutions(&self) -> BTreeMap<String, String> {
        self.substitute
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Relative paths in a settings file are taken relative to that file.
    fn resolve_relative_paths(&mut self, base: Option<&Path>) {
        let Some(base) = base.filter(|base| !base.as_os_str().is_empty()) else {
            return;
        };
        for path in [&mut self.defaults, &mut self.log_file].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
