pub mod defaults;
pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use defaults::{load_defaults_file, parse_defaults, parse_substitution};
pub use error::ConfigError;
pub use load::{load_default_variables, load_settings};
pub use paths::{
    default_settings_path, resolve_settings_path, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
    SETTINGS_PATH_ENV,
};
pub use settings::{Settings, MAX_VERBOSITY};
