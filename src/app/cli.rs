use crate::config::parse_substitution;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Parsed `argreplay` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayCommand {
    pub files: Vec<PathBuf>,
    pub force: bool,
    pub dry_run: bool,
    /// `None` replays the whole history; `--depth 0` means the same.
    pub depth: Option<usize>,
    pub substitutions: BTreeMap<String, String>,
    pub defaults: Option<PathBuf>,
    pub remove: bool,
    pub verbosity: Option<u8>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliRequest {
    Help,
    Replay(ReplayCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliOption {
    Force,
    DryRun,
    Depth,
    Substitute,
    Defaults,
    Remove,
    Verbosity,
    Config,
    Help,
    Unknown,
}

fn parse_cli_option(input: &str) -> CliOption {
    match input {
        "-f" | "--force" => CliOption::Force,
        "--dry-run" => CliOption::DryRun,
        "-d" | "--depth" => CliOption::Depth,
        "--substitute" => CliOption::Substitute,
        "--defaults" => CliOption::Defaults,
        "-r" | "--remove" => CliOption::Remove,
        "-v" | "--verbosity" => CliOption::Verbosity,
        "--config" => CliOption::Config,
        "-h" | "--help" => CliOption::Help,
        _ => CliOption::Unknown,
    }
}

pub fn parse_cli_args(args: &[String]) -> Result<CliRequest, String> {
    let mut command = ReplayCommand::default();
    let mut i = 0usize;

    while i < args.len() {
        let arg = args[i].as_str();
        i += 1;
        if arg == "--" {
            command.files.extend(args[i..].iter().map(PathBuf::from));
            break;
        }
        if !arg.starts_with('-') || arg == "-" {
            command.files.push(PathBuf::from(arg));
            continue;
        }

        let (name, inline) = match arg.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (arg, None),
        };
        let option = parse_cli_option(name);
        let take_value = |i: &mut usize| -> Result<String, String> {
            if let Some(value) = inline.clone() {
                return Ok(value);
            }
            let value = args
                .get(*i)
                .ok_or_else(|| format!("missing value for {name}"))?;
            *i += 1;
            Ok(value.clone())
        };

        match option {
            CliOption::Force => command.force = true,
            CliOption::DryRun => command.dry_run = true,
            CliOption::Remove => command.remove = true,
            CliOption::Help => return Ok(CliRequest::Help),
            CliOption::Depth => {
                let raw = take_value(&mut i)?;
                let depth: usize = raw
                    .parse()
                    .map_err(|_| format!("invalid value for {name}: `{raw}`"))?;
                command.depth = (depth > 0).then_some(depth);
            }
            CliOption::Verbosity => {
                let raw = take_value(&mut i)?;
                command.verbosity = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid value for {name}: `{raw}`"))?,
                );
            }
            CliOption::Defaults => command.defaults = Some(PathBuf::from(take_value(&mut i)?)),
            CliOption::Config => command.config = Some(PathBuf::from(take_value(&mut i)?)),
            CliOption::Substitute => {
                let mut raw_values = Vec::new();
                match inline.clone() {
                    Some(value) => raw_values.push(value),
                    None => {
                        while let Some(value) = args
                            .get(i)
                            .filter(|v| v.contains(':') || !v.starts_with('-'))
                        {
                            raw_values.push(value.clone());
                            i += 1;
                        }
                    }
                }
                if raw_values.is_empty() {
                    return Err(format!("missing value for {name}"));
                }
                for raw in raw_values {
                    let (variable, value) = parse_substitution(&raw).map_err(|e| e.to_string())?;
                    command.substitutions.insert(variable.to_string(), value);
                }
            }
            CliOption::Unknown => return Err(format!("unknown option `{arg}`")),
        }
    }

    if command.files.is_empty() {
        return Err(format!("no input files\n{}", usage_line()));
    }
    Ok(CliRequest::Replay(command))
}

fn usage_line() -> String {
    "usage: argreplay <file>... [options]".to_string()
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        usage_line(),
        String::new(),
        "Re-runs the commands recorded in each file's leading comment block.".to_string(),
        String::new(),
        "Options:".to_string(),
        "  -f, --force                        Run every step regardless of timestamps"
            .to_string(),
        "      --dry-run                      Print the commands instead of running them"
            .to_string(),
        "  -d, --depth <n>                    Replay only the newest n steps (0 = all)"
            .to_string(),
        "      --substitute <name:value>...   Set substitution variables".to_string(),
        "      --defaults <file>              Read name:value defaults from a file".to_string(),
        "  -r, --remove                       Delete each file after reading its history"
            .to_string(),
        "  -v, --verbosity <n>                0 silent, 1 progress, 2 timestamps".to_string(),
        "      --config <file>                Settings file (default ~/.argrecord/config.yaml)"
            .to_string(),
        "  -h, --help                         Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn replay_command(items: &[&str]) -> ReplayCommand {
        match parse_cli_args(&args(items)).expect("parse") {
            CliRequest::Replay(command) => command,
            CliRequest::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn options_and_files_mix_freely() {
        let command = replay_command(&[
            "out.txt",
            "-f",
            "--depth",
            "2",
            "--dry-run",
            "other.txt",
        ]);
        assert_eq!(
            command.files,
            vec![PathBuf::from("out.txt"), PathBuf::from("other.txt")]
        );
        assert!(command.force);
        assert!(command.dry_run);
        assert_eq!(command.depth, Some(2));
        // `-v=2` is not a long option, so it is reported as unknown below.
        assert!(parse_cli_args(&args(&["x", "-v=2"])).is_err());
    }

    #[test]
    fn long_options_accept_inline_values() {
        let command = replay_command(&["--verbosity=2", "--depth=0", "--config=c.yaml", "f"]);
        assert_eq!(command.verbosity, Some(2));
        assert_eq!(command.depth, None);
        assert_eq!(command.config, Some(PathBuf::from("c.yaml")));
    }

    #[test]
    fn substitute_takes_values_until_the_next_option() {
        let command = replay_command(&[
            "--substitute",
            "a:1",
            "b:http://x:8",
            "--remove",
            "f.txt",
        ]);
        assert_eq!(command.substitutions.get("a").map(String::as_str), Some("1"));
        assert_eq!(
            command.substitutions.get("b").map(String::as_str),
            Some("http://x:8")
        );
        assert!(command.remove);
        assert_eq!(command.files, vec![PathBuf::from("f.txt")]);
    }

    #[test]
    fn substitute_values_may_start_with_a_dash() {
        let command = replay_command(&["--substitute", "n:-1", "m:--x", "-f", "f.txt"]);
        assert_eq!(command.substitutions.get("n").map(String::as_str), Some("-1"));
        assert_eq!(command.substitutions.get("m").map(String::as_str), Some("--x"));
        assert!(command.force);
        assert_eq!(command.files, vec![PathBuf::from("f.txt")]);
    }

    #[test]
    fn double_dash_ends_options() {
        let command = replay_command(&["--", "-odd-name.txt"]);
        assert_eq!(command.files, vec![PathBuf::from("-odd-name.txt")]);
    }

    #[test]
    fn invalid_invocations_are_rejected() {
        assert!(parse_cli_args(&args(&[])).is_err());
        assert!(parse_cli_args(&args(&["f", "--depth"])).is_err());
        assert!(parse_cli_args(&args(&["f", "--depth", "many"])).is_err());
        assert!(parse_cli_args(&args(&["f", "--substitute"])).is_err());
        assert!(parse_cli_args(&args(&["f", "--substitute", "novalue"])).is_err());
        assert!(parse_cli_args(&args(&["f", "--bogus"])).is_err());
        assert_eq!(
            parse_cli_args(&args(&["f", "--help"])).expect("help"),
            CliRequest::Help
        );
    }
}
