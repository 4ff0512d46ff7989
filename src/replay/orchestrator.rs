use super::error::ReplayError;
use super::history::{parse_history, HistoryStack, PipelineStep};
use super::pipeline::{render_command, run_pipeline};
use super::substitute::{resolve_all, SubstitutionMap};
use crate::shared::{render_timestamp, ReplayLog, Staleness};
use serde::Serialize;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Run every step regardless of timestamps.
    pub force: bool,
    /// Number of steps recovered from the top of the history; `None` for all.
    pub depth: Option<usize>,
    pub dry_run: bool,
    /// Delete the replayed file once its history has been read.
    pub remove: bool,
    pub variable_overrides: SubstitutionMap,
    pub defaults_variables: SubstitutionMap,
}

impl ReplayOptions {
    /// Defaults first, overrides on top.
    pub fn initial_variables(&self) -> SubstitutionMap {
        let mut variables = self.defaults_variables.clone();
        variables.extend(
            self.variable_overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        variables
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDisposition {
    Skipped,
    Executed,
    DryRun,
}

impl StepDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Executed => "executed",
            Self::DryRun => "dry_run",
        }
    }
}

impl std::fmt::Display for StepDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub line: usize,
    /// One rendered command per piped record, head first. Resolved unless the
    /// step was skipped.
    pub commands: Vec<String>,
    pub disposition: StepDisposition,
    pub captured: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub source: String,
    /// In execution order, oldest step first.
    pub steps: Vec<StepReport>,
    pub variables: SubstitutionMap,
}

impl ReplayReport {
    pub fn count(&self, disposition: StepDisposition) -> usize {
        self.steps
            .iter()
            .filter(|step| step.disposition == disposition)
            .count()
    }

    /// Lines printed for a dry run: one per record, piped records prefixed
    /// with `| `.
    pub fn dry_run_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for step in self
            .steps
            .iter()
            .filter(|step| step.disposition == StepDisposition::DryRun)
        {
            for (index, command) in step.commands.iter().enumerate() {
                if index == 0 {
                    lines.push(command.clone());
                } else {
                    lines.push(format!("| {command}"));
                }
            }
        }
        lines
    }
}

pub fn replay_file(
    path: &Path,
    options: &ReplayOptions,
    log: &ReplayLog,
) -> Result<ReplayReport, ReplayError> {
    let source = path.display().to_string();
    log.progress(1, &format!("Replaying {source}"));

    let file = fs::File::open(path).map_err(|err| ReplayError::Io {
        path: source.clone(),
        source: err,
    })?;
    let stack = parse_history(BufReader::new(file), options.depth)
        .map_err(|err| ReplayError::format(&source, err))?;

    if options.remove {
        if options.dry_run {
            log.progress(1, &format!("Dry run: not removing {source}"));
        } else {
            fs::remove_file(path).map_err(|err| ReplayError::Io {
                path: source.clone(),
                source: err,
            })?;
        }
    }

    replay_history(stack, &source, options, log)
}

pub fn replay<R: BufRead>(
    reader: R,
    source: &str,
    options: &ReplayOptions,
    log: &ReplayLog,
) -> Result<ReplayReport, ReplayError> {
    let stack =
        parse_history(reader, options.depth).map_err(|err| ReplayError::format(source, err))?;
    replay_history(stack, source, options, log)
}

/// Replays `stack` oldest step first. The first failing step aborts the
/// rest; steps already run are not undone.
pub fn replay_history(
    mut stack: HistoryStack,
    source: &str,
    options: &ReplayOptions,
    log: &ReplayLog,
) -> Result<ReplayReport, ReplayError> {
    let mut variables = options.initial_variables();
    let mut report = ReplayReport {
        source: source.to_string(),
        ..ReplayReport::default()
    };
    log.event(
        "info",
        "replay_started",
        source,
        &format!(
            "{} step(s), force={}, dry_run={}",
            stack.len(),
            options.force,
            options.dry_run
        ),
    );

    while let Some(step) = stack.pop_oldest() {
        match replay_step(&step, source, options, log, &mut variables) {
            Ok(step_report) => report.steps.push(step_report),
            Err(err) => {
                log.event("error", "replay_failed", source, &err.to_string());
                return Err(err);
            }
        }
    }

    log.event(
        "info",
        "replay_finished",
        source,
        &format!(
            "{} executed, {} skipped",
            report.count(StepDisposition::Executed),
            report.count(StepDisposition::Skipped)
        ),
    );
    report.variables = variables;
    Ok(report)
}

fn replay_step(
    step: &PipelineStep,
    source: &str,
    options: &ReplayOptions,
    log: &ReplayLog,
    variables: &mut SubstitutionMap,
) -> Result<StepReport, ReplayError> {
    let staleness = Staleness::measure(&step.inputs, &step.outputs);
    log.progress(
        2,
        &format!(
            "{source}:{}: latest input {}, earliest output {}",
            step.line,
            render_timestamp(staleness.latest_input),
            render_timestamp(staleness.earliest_output)
        ),
    );
    let captured = step.output_variable.as_ref().map(ToString::to_string);

    // A capture step always runs so its variable is set for newer steps.
    if !options.force && captured.is_none() && !staleness.requires_execution() {
        let commands: Vec<String> = step
            .command_lines()
            .iter()
            .map(|argv| render_command(argv))
            .collect();
        log.progress(2, &format!("Up to date: {}", commands.join(" | ")));
        log.event("info", "step_skipped", source, &commands.join(" | "));
        return Ok(StepReport {
            line: step.line,
            commands,
            disposition: StepDisposition::Skipped,
            captured: None,
        });
    }

    let resolved = step
        .command_lines()
        .iter()
        .map(|argv| resolve_all(argv, variables))
        .collect::<Result<Vec<_>, _>>()?;
    let commands: Vec<String> = resolved.iter().map(|argv| render_command(argv)).collect();

    if options.dry_run {
        if let Some(name) = &captured {
            variables
                .entry(name.clone())
                .or_insert_with(|| format!("${{{name}}}"));
        }
        log.event("info", "step_dry_run", source, &commands.join(" | "));
        return Ok(StepReport {
            line: step.line,
            commands,
            disposition: StepDisposition::DryRun,
            captured,
        });
    }

    for command in &commands {
        log.progress(1, &format!("Executing: {command}"));
    }
    log.event("info", "step_executed", source, &commands.join(" | "));
    let output = run_pipeline(&resolved, captured.is_some())?;

    if let (Some(name), Some(text)) = (&captured, output) {
        let value = text.trim_end_matches(['\n', '\r']).to_string();
        log.event(
            "info",
            "variable_captured",
            source,
            &format!("{name} ({} bytes)", value.len()),
        );
        variables.insert(name.clone(), value);
    }

    Ok(StepReport {
        line: step.line,
        commands,
        disposition: StepDisposition::Executed,
        captured,
    })
}
