use crate::app::cli::{help_text, parse_cli_args, CliRequest};

pub mod replay;

pub use replay::{cmd_replay, ReplayOutcome};

/// Parses and runs one invocation. Setup errors fail the whole run; per-file
/// failures are collected into the outcome.
pub fn execute_cli(args: Vec<String>) -> Result<ReplayOutcome, String> {
    if args.is_empty() {
        return Ok(ReplayOutcome {
            output: help_text(),
            failures: Vec::new(),
        });
    }
    match parse_cli_args(&args)? {
        CliRequest::Help => Ok(ReplayOutcome {
            output: help_text(),
            failures: Vec::new(),
        }),
        CliRequest::Replay(command) => cmd_replay(&command),
    }
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let outcome = execute_cli(args)?;
    if outcome.succeeded() {
        Ok(outcome.output)
    } else {
        Err(outcome.failures.join("\n"))
    }
}
