use chrono::{SecondsFormat, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_VERBOSITY: u8 = 1;

pub fn append_replay_log(path: &Path, level: &str, event: &str, file: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": level,
        "event": event,
        "file": file,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

/// Progress reporting for one `argreplay` run: human lines on stderr gated
/// by verbosity, and structured lines in the optional log file.
#[derive(Debug, Clone)]
pub struct ReplayLog {
    pub verbosity: u8,
    pub log_file: Option<PathBuf>,
}

impl Default for ReplayLog {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            log_file: None,
        }
    }
}

impl ReplayLog {
    pub fn new(verbosity: u8, log_file: Option<PathBuf>) -> Self {
        Self {
            verbosity,
            log_file,
        }
    }

    pub fn quiet() -> Self {
        Self::new(0, None)
    }

    pub fn progress(&self, level: u8, message: &str) {
        if self.verbosity >= level {
            eprintln!("{message}");
        }
    }

    pub fn event(&self, level: &str, event: &str, file: &str, message: &str) {
        if let Some(path) = &self.log_file {
            append_replay_log(path, level, event, file, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn events_are_appended_as_json_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logs/replay.log");
        let log = ReplayLog::new(0, Some(path.clone()));
        log.event("info", "replay_started", "out.txt", "depth=all");
        log.event("error", "replay_failed", "out.txt", "boom");

        let raw = fs::read_to_string(&path).expect("read log");
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "replay_started");
        assert_eq!(lines[1]["level"], "error");
        assert_eq!(lines[1]["file"], "out.txt");
    }
}
