#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("program name `{program}` must be a non-empty single line without surrounding whitespace")]
    InvalidProgram { program: String },
    #[error("flag `{flag}` must start with `-` and contain no whitespace")]
    InvalidFlag { flag: String },
    #[error("`{program}` argument {flag} is an input/output file but has no value")]
    EmptyDependency { program: String, flag: String },
    #[error("`{program}` writes to a pipe successor and cannot also capture its output")]
    CaptureOnPipeWriter { program: String },
    #[error("`{program}` has no declared argument `{dest}`")]
    UnknownArgument { program: String, dest: String },
    #[error("`{program}` argument `{dest}` is an input/output file and cannot be a boolean flag")]
    DependencyFlag { program: String, dest: String },
    #[error("failed to read comments from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: String,
        backup: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write comments to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
