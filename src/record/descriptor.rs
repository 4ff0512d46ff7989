use super::{ArgumentRole, ArgumentToken, InvocationRecord, PipeRole, RecordError};
use crate::shared::{Staleness, VariableName};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One declared argument of a recording tool. Role and privacy are fixed when
/// the argument is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub dest: String,
    /// Aliases in declaration order; empty for a positional argument.
    pub flags: Vec<String>,
    pub role: ArgumentRole,
    pub private: bool,
}

impl ArgumentDescriptor {
    pub fn positional(dest: &str) -> Self {
        Self {
            dest: dest.to_string(),
            flags: Vec::new(),
            role: ArgumentRole::Plain,
            private: false,
        }
    }

    pub fn flag(dest: &str, flags: &[&str]) -> Self {
        Self {
            dest: dest.to_string(),
            flags: flags.iter().map(|flag| flag.to_string()).collect(),
            role: ArgumentRole::Plain,
            private: false,
        }
    }

    pub fn input(mut self) -> Self {
        self.role = ArgumentRole::Input;
        self
    }

    pub fn output(mut self) -> Self {
        self.role = ArgumentRole::Output;
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// The spelling written to the comment block: the last declared alias.
    pub fn spelling(&self) -> Option<&str> {
        self.flags.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Absent,
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

pub type ArgValues = BTreeMap<String, ArgValue>;

#[derive(Debug, Clone)]
pub struct ArgumentRecorder {
    program: String,
    descriptors: Vec<ArgumentDescriptor>,
}

impl ArgumentRecorder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            descriptors: Vec::new(),
        }
    }

    pub fn argument(mut self, descriptor: ArgumentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    pub fn build_record(&self, values: &ArgValues) -> Result<InvocationRecord, RecordError> {
        self.build_piped_record(values, PipeRole::Standalone, None)
    }

    pub fn build_piped_record(
        &self,
        values: &ArgValues,
        pipe_role: PipeRole,
        output_variable: Option<VariableName>,
    ) -> Result<InvocationRecord, RecordError> {
        self.reject_unknown(values)?;

        let mut record = InvocationRecord::new(self.program.clone()).with_pipe_role(pipe_role);
        record.output_variable = output_variable;

        for descriptor in self.descriptors.iter().filter(|d| !d.private) {
            let Some(value) = values.get(&descriptor.dest) else {
                continue;
            };
            let flag = descriptor.spelling();
            match value {
                ArgValue::Absent | ArgValue::Flag(false) => {}
                ArgValue::Flag(true) => {
                    if descriptor.role.is_dependency() {
                        return Err(RecordError::DependencyFlag {
                            program: self.program.clone(),
                            dest: descriptor.dest.clone(),
                        });
                    }
                    if let Some(flag) = flag {
                        record.arguments.push(ArgumentToken::switch(flag));
                    }
                }
                ArgValue::Text(text) => {
                    record
                        .arguments
                        .push(ArgumentToken::new(descriptor.role, flag, Some(text)));
                }
                ArgValue::List(items) => {
                    for item in items {
                        record.arguments.push(
                            ArgumentToken::new(descriptor.role, flag, Some(item)).list_element(),
                        );
                    }
                }
            }
        }

        record.validate()?;
        Ok(record)
    }

    pub fn inputs(&self, values: &ArgValues) -> Vec<PathBuf> {
        self.dependency_paths(values, ArgumentRole::Input)
    }

    pub fn outputs(&self, values: &ArgValues) -> Vec<PathBuf> {
        self.dependency_paths(values, ArgumentRole::Output)
    }

    /// Whether the tool's declared outputs are out of date with respect to
    /// its declared inputs.
    pub fn replay_required(&self, values: &ArgValues) -> bool {
        Staleness::measure(self.inputs(values), self.outputs(values)).requires_execution()
    }

    fn dependency_paths(&self, values: &ArgValues, role: ArgumentRole) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for descriptor in self.descriptors.iter().filter(|d| d.role == role) {
            match values.get(&descriptor.dest) {
                Some(ArgValue::Text(text)) if !text.is_empty() => paths.push(PathBuf::from(text)),
                Some(ArgValue::List(items)) => paths.extend(
                    items
                        .iter()
                        .filter(|item| !item.is_empty())
                        .map(PathBuf::from),
                ),
                _ => {}
            }
        }
        paths
    }

    fn reject_unknown(&self, values: &ArgValues) -> Result<(), RecordError> {
        for dest in values.keys() {
            if !self.descriptors.iter().any(|d| &d.dest == dest) {
                return Err(RecordError::UnknownArgument {
                    program: self.program.clone(),
                    dest: dest.clone(),
                });
            }
        }
        Ok(())
    }
}
