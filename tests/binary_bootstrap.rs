use argrecord::record::{encode_record, ArgumentRole, ArgumentToken, InvocationRecord};
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn binary_replays_history_and_reads_home_settings() {
    let dir = tempdir().expect("tempdir");
    let home = dir.path();
    fs::create_dir_all(home.join(".argrecord")).expect("create config dir");
    fs::write(
        home.join(".argrecord/config.yaml"),
        "verbosity: 0\nsubstitute:\n  word: from-settings\n",
    )
    .expect("write settings");

    let history = home.join("history.txt");
    let record = InvocationRecord::new("echo")
        .with_argument(ArgumentToken::positional(ArgumentRole::Plain, "${word}"));
    fs::write(&history, encode_record(&record, None).expect("encode")).expect("history");

    let output = Command::new(env!("CARGO_BIN_EXE_argreplay"))
        .arg(&history)
        .env("HOME", home)
        .env_remove("ARGREPLAY_CONFIG")
        .output()
        .expect("run binary");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "from-settings\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn binary_exits_non_zero_when_a_file_fails() {
    let dir = tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_argreplay"))
        .arg(dir.path().join("missing.txt"))
        .env("HOME", dir.path())
        .env_remove("ARGREPLAY_CONFIG")
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("argreplay:"));
    assert!(stderr.contains("missing.txt"));
}

#[test]
fn help_goes_to_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_argreplay"))
        .arg("--help")
        .output()
        .expect("run binary");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("usage: argreplay"));
}
