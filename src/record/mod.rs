pub mod descriptor;
pub mod encode;
pub mod error;
pub mod write;

pub use descriptor::{ArgValue, ArgValues, ArgumentDescriptor, ArgumentRecorder};
pub use encode::{
    argument_line, encode_record, header_line, quote_value, separator_line, ARGUMENT_INDENT,
    SEPARATOR_FILL, SEPARATOR_WIDTH,
};
pub use error::RecordError;
pub use write::{
    read_prior_comments, write_comments, CommentTarget, LeadingComments, Placement, WriteOptions,
};

use crate::shared::VariableName;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentRole {
    Input,
    Output,
    Plain,
}

impl ArgumentRole {
    pub fn marker(self) -> char {
        match self {
            Self::Input => '<',
            Self::Output => '>',
            Self::Plain => ' ',
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '<' => Some(Self::Input),
            '>' => Some(Self::Output),
            ' ' => Some(Self::Plain),
            _ => None,
        }
    }

    pub fn is_dependency(self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentToken {
    pub role: ArgumentRole,
    pub flag: Option<String>,
    /// `None` marks a boolean flag that was set.
    pub value: Option<String>,
    pub is_list_element: bool,
}

impl ArgumentToken {
    pub fn new(role: ArgumentRole, flag: Option<&str>, value: Option<&str>) -> Self {
        Self {
            role,
            flag: flag.map(str::to_string),
            value: value.map(str::to_string),
            is_list_element: false,
        }
    }

    pub fn positional(role: ArgumentRole, value: &str) -> Self {
        Self::new(role, None, Some(value))
    }

    pub fn switch(flag: &str) -> Self {
        Self::new(ArgumentRole::Plain, Some(flag), None)
    }

    pub fn option(role: ArgumentRole, flag: &str, value: &str) -> Self {
        Self::new(role, Some(flag), Some(value))
    }

    pub fn list_element(mut self) -> Self {
        self.is_list_element = true;
        self
    }

    fn push_argv(&self, argv: &mut Vec<String>) {
        if let Some(flag) = &self.flag {
            argv.push(flag.clone());
        }
        if let Some(value) = &self.value {
            argv.push(value.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeRole {
    #[default]
    Standalone,
    PipeHead,
    PipeMiddle,
    PipeTail,
}

impl PipeRole {
    pub fn from_markers(reads_pipe: bool, writes_pipe: bool) -> Self {
        match (reads_pipe, writes_pipe) {
            (false, false) => Self::Standalone,
            (false, true) => Self::PipeHead,
            (true, true) => Self::PipeMiddle,
            (true, false) => Self::PipeTail,
        }
    }

    /// Stdin comes from a pipe predecessor.
    pub fn reads_pipe(self) -> bool {
        matches!(self, Self::PipeMiddle | Self::PipeTail)
    }

    /// Stdout feeds a pipe successor.
    pub fn writes_pipe(self) -> bool {
        matches!(self, Self::PipeHead | Self::PipeMiddle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationRecord {
    pub program: String,
    pub arguments: Vec<ArgumentToken>,
    pub pipe_role: PipeRole,
    pub output_variable: Option<VariableName>,
}

impl InvocationRecord {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arguments: Vec::new(),
            pipe_role: PipeRole::Standalone,
            output_variable: None,
        }
    }

    pub fn with_pipe_role(mut self, pipe_role: PipeRole) -> Self {
        self.pipe_role = pipe_role;
        self
    }

    pub fn with_output_variable(mut self, variable: VariableName) -> Self {
        self.output_variable = Some(variable);
        self
    }

    pub fn with_argument(mut self, token: ArgumentToken) -> Self {
        self.arguments.push(token);
        self
    }

    /// The literal command to re-execute: program first, then every flag
    /// and value in recorded order.
    pub fn command_line(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        for token in &self.arguments {
            token.push_argv(&mut argv);
        }
        argv
    }

    pub fn inputs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.paths_with_role(ArgumentRole::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.paths_with_role(ArgumentRole::Output)
    }

    fn paths_with_role(&self, role: ArgumentRole) -> impl Iterator<Item = PathBuf> + '_ {
        self.arguments
            .iter()
            .filter(move |token| token.role == role)
            .filter_map(|token| token.value.as_deref())
            .map(PathBuf::from)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.program.is_empty()
            || self.program.trim() != self.program
            || self.program.contains(['\n', '\r'])
        {
            return Err(RecordError::InvalidProgram {
                program: self.program.clone(),
            });
        }
        if self.output_variable.is_some() && self.pipe_role.writes_pipe() {
            return Err(RecordError::CaptureOnPipeWriter {
                program: self.program.clone(),
            });
        }
        for token in &self.arguments {
            if let Some(flag) = &token.flag {
                if !flag.starts_with('-') || flag.chars().any(char::is_whitespace) {
                    return Err(RecordError::InvalidFlag { flag: flag.clone() });
                }
            }
            if token.role.is_dependency() && token.value.as_deref().unwrap_or("").is_empty() {
                return Err(RecordError::EmptyDependency {
                    program: self.program.clone(),
                    flag: token.flag.clone().unwrap_or_else(|| "<positional>".to_string()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_keeps_recorded_order() {
        let record = InvocationRecord::new("copy")
            .with_argument(ArgumentToken::switch("--verbose"))
            .with_argument(ArgumentToken::option(ArgumentRole::Plain, "--log", "l.txt"))
            .with_argument(ArgumentToken::positional(ArgumentRole::Input, "in.txt"))
            .with_argument(ArgumentToken::positional(ArgumentRole::Output, "out.txt"));

        assert_eq!(
            record.command_line(),
            vec!["copy", "--verbose", "--log", "l.txt", "in.txt", "out.txt"]
        );
        assert_eq!(record.inputs().collect::<Vec<_>>(), vec![PathBuf::from("in.txt")]);
        assert_eq!(record.outputs().collect::<Vec<_>>(), vec![PathBuf::from("out.txt")]);
    }

    #[test]
    fn dependency_tokens_need_a_value() {
        let record = InvocationRecord::new("copy").with_argument(ArgumentToken::new(
            ArgumentRole::Input,
            Some("--in"),
            Some(""),
        ));
        assert!(matches!(
            record.validate(),
            Err(RecordError::EmptyDependency { .. })
        ));
    }

    #[test]
    fn program_names_must_be_bare_single_lines() {
        for program in ["", "  prog", "prog ", "pro\ngram", "prog\r"] {
            assert!(
                matches!(
                    InvocationRecord::new(program).validate(),
                    Err(RecordError::InvalidProgram { .. })
                ),
                "{program:?} accepted"
            );
        }
        assert!(InvocationRecord::new("my tool").validate().is_ok());
    }

    #[test]
    fn pipe_writers_cannot_capture_output() {
        let record = InvocationRecord::new("sort")
            .with_pipe_role(PipeRole::PipeHead)
            .with_output_variable(VariableName::parse("sorted").expect("name"));
        assert!(matches!(
            record.validate(),
            Err(RecordError::CaptureOnPipeWriter { .. })
        ));
    }

    #[test]
    fn pipe_roles_map_to_markers() {
        assert_eq!(PipeRole::from_markers(false, false), PipeRole::Standalone);
        assert_eq!(PipeRole::from_markers(false, true), PipeRole::PipeHead);
        assert_eq!(PipeRole::from_markers(true, true), PipeRole::PipeMiddle);
        assert_eq!(PipeRole::from_markers(true, false), PipeRole::PipeTail);
        assert!(PipeRole::PipeMiddle.reads_pipe() && PipeRole::PipeMiddle.writes_pipe());
    }
}
