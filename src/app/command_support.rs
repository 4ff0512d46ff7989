use crate::app::cli::ReplayCommand;
use crate::config::{load_default_variables, load_settings, ConfigError, Settings};
use crate::replay::ReplayOptions;
use crate::shared::{ReplayLog, DEFAULT_VERBOSITY};

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn load_command_settings(command: &ReplayCommand) -> Result<Settings, String> {
    load_settings(command.config.as_deref()).map_err(map_config_err)
}

/// Settings `substitute`, then the defaults file, then `--substitute`.
pub fn replay_options(
    command: &ReplayCommand,
    settings: &Settings,
) -> Result<ReplayOptions, String> {
    let defaults_variables =
        load_default_variables(settings, command.defaults.as_deref()).map_err(map_config_err)?;
    Ok(ReplayOptions {
        force: command.force,
        depth: command.depth,
        dry_run: command.dry_run,
        remove: command.remove,
        variable_overrides: command.substitutions.clone(),
        defaults_variables,
    })
}

pub fn replay_log(command: &ReplayCommand, settings: &Settings) -> ReplayLog {
    let verbosity = command
        .verbosity
        .or(settings.verbosity)
        .unwrap_or(DEFAULT_VERBOSITY);
    ReplayLog::new(verbosity, settings.log_file.clone())
}
