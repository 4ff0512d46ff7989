use argrecord::app::{execute_cli, run_cli};
use argrecord::record::{encode_record, ArgumentRole, ArgumentToken, InvocationRecord};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_history(path: &Path, records: &[InvocationRecord]) {
    let mut content = String::new();
    for record in records {
        content.push_str(&encode_record(record, None).expect("encode"));
    }
    fs::write(path, content).expect("write history");
}

fn append(log: &Path, text: &str) -> InvocationRecord {
    InvocationRecord::new("sh")
        .with_argument(ArgumentToken::positional(ArgumentRole::Plain, "-c"))
        .with_argument(ArgumentToken::positional(
            ArgumentRole::Plain,
            &format!("echo {text} >> \"$0\""),
        ))
        .with_argument(ArgumentToken::positional(
            ArgumentRole::Plain,
            &log.display().to_string(),
        ))
}

fn quiet_settings(dir: &Path) -> String {
    let path = dir.join("settings.yaml");
    fs::write(&path, "verbosity: 0\n").expect("settings");
    path.display().to_string()
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn dry_run_prints_resolved_commands_without_running_them() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("never.log");
    let history = dir.path().join("history.txt");
    let record = InvocationRecord::new("echo")
        .with_argument(ArgumentToken::positional(ArgumentRole::Plain, "${greeting}"));
    write_history(&history, &[record, append(&log, "x")]);
    let config = quiet_settings(dir.path());

    let output = run_cli(args(&[
        history.to_str().expect("utf8"),
        "--dry-run",
        "--config",
        &config,
        "--substitute",
        "greeting:hello world",
    ]))
    .expect("dry run");

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("sh -c"));
    assert_eq!(lines[1], "echo \"hello world\"");
    assert!(!log.exists());
}

#[test]
fn a_failing_file_does_not_stop_the_others() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("ran.log");
    let missing = dir.path().join("missing.txt");
    let broken = dir.path().join("broken.txt");
    let good = dir.path().join("good.txt");
    fs::write(&broken, "#< uniq\n").expect("broken");
    write_history(&good, &[append(&log, "good")]);
    let config = quiet_settings(dir.path());

    let outcome = execute_cli(args(&[
        missing.to_str().expect("utf8"),
        broken.to_str().expect("utf8"),
        good.to_str().expect("utf8"),
        "--config",
        &config,
    ]))
    .expect("outcome");

    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.failures[0].contains("missing.txt"));
    assert!(outcome.failures[1].contains("malformed history"));
    assert_eq!(fs::read_to_string(&log).expect("log"), "good\n");

    let err = run_cli(args(&[
        missing.to_str().expect("utf8"),
        "--config",
        &config,
    ]))
    .expect_err("failure");
    assert!(err.contains("missing.txt"));
}

#[test]
fn defaults_file_supplies_variables_and_substitute_overrides_it() {
    let dir = tempdir().expect("tempdir");
    let history = dir.path().join("history.txt");
    let defaults = dir.path().join("defaults.txt");
    fs::write(&defaults, "name:from-defaults\nother:kept\n").expect("defaults");
    let record = InvocationRecord::new("echo")
        .with_argument(ArgumentToken::positional(ArgumentRole::Plain, "${name}"))
        .with_argument(ArgumentToken::positional(ArgumentRole::Plain, "${other}"));
    write_history(&history, &[record]);
    let config = quiet_settings(dir.path());

    let output = run_cli(args(&[
        history.to_str().expect("utf8"),
        "--dry-run",
        "--config",
        &config,
        "--defaults",
        defaults.to_str().expect("utf8"),
    ]))
    .expect("dry run");
    assert_eq!(output, "echo from-defaults kept");

    let output = run_cli(args(&[
        history.to_str().expect("utf8"),
        "--dry-run",
        "--config",
        &config,
        "--defaults",
        defaults.to_str().expect("utf8"),
        "--substitute",
        "name:cli",
    ]))
    .expect("dry run");
    assert_eq!(output, "echo cli kept");
}

#[test]
fn missing_substitution_is_reported_with_the_variable_name() {
    let dir = tempdir().expect("tempdir");
    let history = dir.path().join("history.txt");
    let record = InvocationRecord::new("echo")
        .with_argument(ArgumentToken::positional(ArgumentRole::Plain, "${absent}"));
    write_history(&history, &[record]);
    let config = quiet_settings(dir.path());

    let err = run_cli(args(&[
        history.to_str().expect("utf8"),
        "--config",
        &config,
    ]))
    .expect_err("missing");
    assert!(err.contains("missing substitution for variable `absent`"));
}
