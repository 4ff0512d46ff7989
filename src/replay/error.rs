/// Malformed embedded history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("line {line}: expected a command header, found `{text}`")]
    MissingHeader { line: usize, text: String },
    #[error("line {line}: separator is not followed by a command header")]
    SeparatorWithoutHeader { line: usize },
    #[error("line {line}: unterminated quoted value")]
    UnterminatedQuote { line: usize },
    #[error("line {line}: unexpected text after quoted value: `{text}`")]
    TrailingText { line: usize, text: String },
    #[error("line {line}: `{program}` is piped but its pipe partner is missing")]
    IncompletePipe { line: usize, program: String },
    #[error("line {line}: `{program}` does not connect to the pipe recorded above it")]
    PipeMismatch { line: usize, program: String },
    #[error("line {line}: more than one command in one pipe captures output")]
    DuplicateCapture { line: usize },
    #[error("line {line}: invalid capture variable: {reason}")]
    InvalidVariable { line: usize, reason: String },
    #[error("failed to read history: {0}")]
    Read(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SubstitutionError {
    #[error("missing substitution for variable `{name}`")]
    MissingSubstitution { name: String },
    #[error("malformed substitution in `{text}`: {reason}")]
    Malformed { text: String, reason: String },
    #[error("invalid substitution pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("malformed history in {file}: {source}")]
    Format {
        file: String,
        #[source]
        source: HistoryError,
    },
    #[error(transparent)]
    Substitution(#[from] SubstitutionError),
    #[error("command `{command}` failed with exit code {exit_code}")]
    ProcessFailure { command: String, exit_code: i32 },
    #[error("program `{program}` was not found")]
    MissingBinary { program: String },
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("recorded command has no program")]
    EmptyCommand,
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ReplayError {
    pub fn format(file: &str, source: HistoryError) -> Self {
        Self::Format {
            file: file.to_string(),
            source,
        }
    }
}
