//! Recovers the chain of recorded invocations from the comment header of a
//! file. Blocks are stored newest first; records of one OS pipe are grouped
//! into a single [`PipelineStep`].

use super::error::HistoryError;
use crate::record::{ArgumentRole, ArgumentToken, InvocationRecord, PipeRole};
use crate::shared::ids::is_identifier_char;
use crate::shared::VariableName;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStep {
    /// Pipe order: head first, tail last.
    pub records: Vec<InvocationRecord>,
    pub inputs: BTreeSet<PathBuf>,
    pub outputs: BTreeSet<PathBuf>,
    pub output_variable: Option<VariableName>,
    /// Line of the step's first header in the source stream.
    pub line: usize,
}

impl PipelineStep {
    pub fn new(records: Vec<InvocationRecord>, line: usize) -> Result<Self, HistoryError> {
        let mut inputs = BTreeSet::new();
        let mut outputs = BTreeSet::new();
        let mut output_variable = None;
        for record in &records {
            inputs.extend(record.inputs());
            outputs.extend(record.outputs());
            if let Some(variable) = &record.output_variable {
                if output_variable.is_some() {
                    return Err(HistoryError::DuplicateCapture { line });
                }
                output_variable = Some(variable.clone());
            }
        }
        Ok(Self {
            records,
            inputs,
            outputs,
            output_variable,
            line,
        })
    }

    pub fn command_lines(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(InvocationRecord::command_line)
            .collect()
    }
}

/// Steps in storage order, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStack {
    steps: Vec<PipelineStep>,
}

impl HistoryStack {
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Removes the oldest remaining step; upstream steps come out first.
    pub fn pop_oldest(&mut self) -> Option<PipelineStep> {
        self.steps.pop()
    }
}

/// Parses at most `depth` steps from the top of `reader`. Parsing stops at
/// the first line that is not part of the comment header.
pub fn parse_history<R: BufRead>(
    reader: R,
    depth: Option<usize>,
) -> Result<HistoryStack, HistoryError> {
    let mut parser = HistoryParser::new(reader);
    let mut steps = Vec::new();
    while depth.map_or(true, |limit| steps.len() < limit) {
        match parser.parse_step()? {
            Some(step) => steps.push(step),
            None => break,
        }
    }
    Ok(HistoryStack { steps })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Separator,
    Continuation,
    Header,
    Argument,
    Other,
}

struct Header<'a> {
    reads_pipe: bool,
    writes_pipe: bool,
    variable: Option<&'a str>,
    program: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Each tool prepended its block above its upstream's.
    TailFirst,
    /// Each tool appended its block below its upstream's.
    HeadFirst,
}

struct ParsedRecord {
    record: InvocationRecord,
    line: usize,
}

/// A physical line split from its terminator (`\n`, `\r\n` or nothing at
/// end of stream).
struct RawLine {
    text: String,
    terminator: &'static str,
}

struct HistoryParser<R> {
    reader: R,
    peeked: Option<RawLine>,
    /// Terminator of the line most recently taken.
    terminator: &'static str,
    line_no: usize,
    exhausted: bool,
}

impl<R: BufRead> HistoryParser<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            terminator: "",
            line_no: 0,
            exhausted: false,
        }
    }

    fn fill(&mut self) -> Result<(), HistoryError> {
        if self.peeked.is_some() || self.exhausted {
            return Ok(());
        }
        let mut text = String::new();
        if self.reader.read_line(&mut text).map_err(HistoryError::Read)? == 0 {
            self.exhausted = true;
            return Ok(());
        }
        let terminator = if text.ends_with("\r\n") {
            "\r\n"
        } else if text.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        text.truncate(text.len() - terminator.len());
        self.line_no += 1;
        self.peeked = Some(RawLine { text, terminator });
        Ok(())
    }

    fn peek_kind(&mut self) -> Result<Option<LineKind>, HistoryError> {
        self.fill()?;
        Ok(self.peeked.as_ref().map(|line| classify(&line.text)))
    }

    fn take(&mut self) -> Result<Option<String>, HistoryError> {
        self.fill()?;
        Ok(self.peeked.take().map(|line| {
            self.terminator = line.terminator;
            line.text
        }))
    }

    fn parse_step(&mut self) -> Result<Option<PipelineStep>, HistoryError> {
        let Some(first) = self.parse_record()? else {
            return Ok(None);
        };
        let line = first.line;
        let orientation = match first.record.pipe_role {
            role if role.reads_pipe() => Some(Orientation::TailFirst),
            PipeRole::PipeHead => Some(Orientation::HeadFirst),
            _ => None,
        };
        let mut records = vec![first.record];

        if let Some(orientation) = orientation {
            loop {
                let Some(last) = records.last() else {
                    break;
                };
                let continues = match orientation {
                    Orientation::TailFirst => last.pipe_role.reads_pipe(),
                    Orientation::HeadFirst => last.pipe_role.writes_pipe(),
                };
                if !continues {
                    break;
                }
                let program = last.program.clone();
                let Some(next) = self.parse_record()? else {
                    return Err(HistoryError::IncompletePipe {
                        line: self.line_no,
                        program,
                    });
                };
                let connects = match orientation {
                    Orientation::TailFirst => next.record.pipe_role.writes_pipe(),
                    Orientation::HeadFirst => next.record.pipe_role.reads_pipe(),
                };
                if !connects {
                    return Err(HistoryError::PipeMismatch {
                        line: next.line,
                        program: next.record.program,
                    });
                }
                records.push(next.record);
            }
            if orientation == Orientation::TailFirst {
                records.reverse();
            }
        }

        PipelineStep::new(records, line).map(Some)
    }

    fn parse_record(&mut self) -> Result<Option<ParsedRecord>, HistoryError> {
        let mut separator_line = None;
        loop {
            let Some(kind) = self.peek_kind()? else {
                return match separator_line {
                    Some(line) => Err(HistoryError::SeparatorWithoutHeader { line }),
                    None => Ok(None),
                };
            };
            match kind {
                LineKind::Header => break,
                LineKind::Continuation => {
                    self.take()?;
                }
                LineKind::Separator => {
                    self.take()?;
                    separator_line = Some(self.line_no);
                }
                LineKind::Other if separator_line.is_none() => return Ok(None),
                LineKind::Argument | LineKind::Other => {
                    let text = self.take()?.unwrap_or_default();
                    return Err(HistoryError::MissingHeader {
                        line: self.line_no,
                        text,
                    });
                }
            }
        }

        let header_text = self.take()?.unwrap_or_default();
        let line = self.line_no;
        let header = header_text
            .strip_prefix('#')
            .and_then(parse_header)
            .ok_or_else(|| HistoryError::MissingHeader {
                line,
                text: header_text.clone(),
            })?;

        let mut record = InvocationRecord::new(header.program).with_pipe_role(
            PipeRole::from_markers(
                header.reads_pipe,
                header.writes_pipe && header.variable.is_none(),
            ),
        );
        if let Some(variable) = header.variable {
            let variable = VariableName::parse(variable)
                .map_err(|reason| HistoryError::InvalidVariable { line, reason })?;
            record.output_variable = Some(variable);
        }

        loop {
            match self.peek_kind()? {
                Some(LineKind::Argument) => {
                    let Some(text) = self.take()? else {
                        break;
                    };
                    if let Some(token) = self.parse_argument(&text)? {
                        record.arguments.push(token);
                    }
                }
                Some(LineKind::Continuation) => {
                    self.take()?;
                }
                _ => break,
            }
        }
        mark_list_elements(&mut record.arguments);

        Ok(Some(ParsedRecord { record, line }))
    }

    fn parse_argument(&mut self, text: &str) -> Result<Option<ArgumentToken>, HistoryError> {
        let mut chars = text.chars();
        chars.next();
        let Some(role) = chars.next().and_then(ArgumentRole::from_marker) else {
            return Ok(None);
        };
        let content = chars.as_str().trim_start();
        if content.is_empty() {
            return Ok(None);
        }

        let (flag, remainder) = if content.starts_with('-') {
            let end = content
                .find(|ch: char| ch.is_whitespace() || ch == '=')
                .unwrap_or(content.len());
            let remainder = content[end..].trim_start();
            let remainder = remainder.strip_prefix('=').unwrap_or(remainder);
            (Some(content[..end].to_string()), remainder.trim_start())
        } else {
            (None, content)
        };

        let value = if remainder.is_empty() {
            None
        } else if let Some(quoted) = remainder.strip_prefix('"') {
            Some(self.read_quoted(quoted)?)
        } else {
            Some(remainder.trim_end().to_string())
        };

        Ok(Some(ArgumentToken {
            role,
            flag,
            value,
            is_list_element: false,
        }))
    }

    /// Reads a quoted value whose opening quote has been consumed, pulling
    /// further raw lines until the closing quote.
    fn read_quoted(&mut self, first: &str) -> Result<String, HistoryError> {
        let start_line = self.line_no;
        let mut value = String::new();
        let mut segment = first.to_string();
        let mut escaped = false;

        loop {
            let mut chars = segment.chars();
            while let Some(ch) = chars.next() {
                if escaped {
                    value.push(ch);
                    escaped = false;
                    continue;
                }
                match ch {
                    '\\' => escaped = true,
                    '"' => {
                        let trailing = chars.as_str().trim();
                        if !trailing.is_empty() {
                            return Err(HistoryError::TrailingText {
                                line: self.line_no,
                                text: trailing.to_string(),
                            });
                        }
                        return Ok(value);
                    }
                    _ => value.push(ch),
                }
            }

            escaped = false;
            value.push_str(self.terminator);
            let Some(next) = self.take()? else {
                return Err(HistoryError::UnterminatedQuote { line: start_line });
            };
            segment = next;
        }
    }
}

fn classify(line: &str) -> LineKind {
    if is_separator(line) {
        return LineKind::Separator;
    }
    if line == "#" || line.starts_with("##") {
        return LineKind::Continuation;
    }
    let Some(rest) = line.strip_prefix('#') else {
        return LineKind::Other;
    };
    if parse_header(rest).is_some() {
        return LineKind::Header;
    }
    let mut chars = rest.chars();
    match chars.next().and_then(ArgumentRole::from_marker) {
        Some(_) if chars.as_str().starts_with(' ') => LineKind::Argument,
        _ => LineKind::Other,
    }
}

/// A run of at least three `#`, or a label framed by at least two `#` and a
/// space on each side.
fn is_separator(line: &str) -> bool {
    let leading = line.chars().take_while(|ch| *ch == '#').count();
    if leading == line.len() {
        return leading >= 3;
    }
    if leading < 2 {
        return false;
    }
    let rest = &line[leading..];
    let trailing = rest.chars().rev().take_while(|ch| *ch == '#').count();
    if trailing < 2 {
        return false;
    }
    let label = &rest[..rest.len() - trailing];
    label.len() >= 3 && label.starts_with(' ') && label.ends_with(' ')
}

/// `[<][>[VAR]] program` after the leading `#`; exactly one space before the
/// program name.
fn parse_header(rest: &str) -> Option<Header<'_>> {
    let mut cursor = rest;
    let reads_pipe = match cursor.strip_prefix('<') {
        Some(after) => {
            cursor = after;
            true
        }
        None => false,
    };
    let mut writes_pipe = false;
    let mut variable = None;
    if let Some(after) = cursor.strip_prefix('>') {
        writes_pipe = true;
        let end = after
            .find(|ch: char| !is_identifier_char(ch))
            .unwrap_or(after.len());
        if end > 0 {
            variable = Some(&after[..end]);
        }
        cursor = &after[end..];
    }
    let program = cursor.strip_prefix(' ')?.trim_end();
    if program.is_empty() || cursor[1..].starts_with(char::is_whitespace) {
        return None;
    }
    Some(Header {
        reads_pipe,
        writes_pipe,
        variable,
        program,
    })
}

fn mark_list_elements(tokens: &mut [ArgumentToken]) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for flag in tokens.iter().filter_map(|token| token.flag.as_ref()) {
        *counts.entry(flag.clone()).or_default() += 1;
    }
    for token in tokens.iter_mut() {
        if let Some(flag) = &token.flag {
            token.is_list_element = counts.get(flag).copied().unwrap_or(0) > 1;
        }
    }
}
