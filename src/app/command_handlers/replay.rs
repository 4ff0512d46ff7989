use crate::app::cli::ReplayCommand;
use crate::app::command_support::{load_command_settings, replay_log, replay_options};
use crate::replay::replay_file;

/// What one `argreplay` run produced: text for stdout and one message per
/// file that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub output: String,
    pub failures: Vec<String>,
}

impl ReplayOutcome {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replays each file in order. A failing file is reported and the remaining
/// files are still replayed.
pub fn cmd_replay(command: &ReplayCommand) -> Result<ReplayOutcome, String> {
    let settings = load_command_settings(command)?;
    let options = replay_options(command, &settings)?;
    let log = replay_log(command, &settings);

    let mut outcome = ReplayOutcome::default();
    let mut lines = Vec::new();
    for file in &command.files {
        match replay_file(file, &options, &log) {
            Ok(report) => {
                if options.dry_run {
                    lines.extend(report.dry_run_lines());
                }
            }
            Err(err) => outcome
                .failures
                .push(format!("{}: {err}", file.display())),
        }
    }
    outcome.output = lines.join("\n");
    Ok(outcome)
}
