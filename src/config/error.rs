#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("settings validation failed: {0}")]
    Settings(String),
    #[error("{path}:{line}: expected `name:value`, found `{text}`")]
    DefaultsLine {
        path: String,
        line: usize,
        text: String,
    },
    #[error("invalid substitution `{raw}`: {reason}")]
    Substitution { raw: String, reason: String },
    #[error("failed to resolve home directory for settings path")]
    HomeDirectoryUnavailable,
}
