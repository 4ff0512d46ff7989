use super::error::ReplayError;
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

/// Renders argv for display, quoting items that contain spaces.
pub fn render_command(argv: &[String]) -> String {
    argv.iter()
        .map(|item| {
            if item.is_empty() || item.contains(char::is_whitespace) {
                format!("\"{item}\"")
            } else {
                item.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs `commands` as one OS pipe, head first. The tail writes to the
/// parent's stdout unless `capture` is set, in which case its output is
/// returned. Blocks until every process has exited.
pub fn run_pipeline(commands: &[Vec<String>], capture: bool) -> Result<Option<String>, ReplayError> {
    let mut children: Vec<(String, Child)> = Vec::new();
    let mut upstream: Option<ChildStdout> = None;

    for (index, argv) in commands.iter().enumerate() {
        let Some((program, args)) = argv.split_first() else {
            reap(&mut children);
            return Err(ReplayError::EmptyCommand);
        };
        let is_tail = index + 1 == commands.len();
        let piped_out = !is_tail || capture;

        let mut command = Command::new(program);
        command.args(args).stderr(Stdio::inherit());
        match upstream.take() {
            Some(stdout) => command.stdin(Stdio::from(stdout)),
            None => command.stdin(Stdio::inherit()),
        };
        if piped_out {
            command.stdout(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit());
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                drop(command);
                reap(&mut children);
                if err.kind() == std::io::ErrorKind::NotFound {
                    return Err(ReplayError::MissingBinary {
                        program: program.clone(),
                    });
                }
                return Err(ReplayError::Spawn {
                    program: program.clone(),
                    source: err,
                });
            }
        };
        if piped_out {
            upstream = child.stdout.take();
        }
        children.push((render_command(argv), child));
    }

    let captured = match upstream.take() {
        Some(mut stdout) if capture => {
            let mut buf = Vec::new();
            let read = stdout.read_to_end(&mut buf);
            drop(stdout);
            if let Err(source) = read {
                let command = children
                    .last()
                    .map(|(command, _)| command.clone())
                    .unwrap_or_default();
                reap(&mut children);
                return Err(ReplayError::Wait { command, source });
            }
            Some(String::from_utf8_lossy(&buf).into_owned())
        }
        _ => None,
    };

    let mut failure = None;
    for (command, mut child) in children {
        let status = child
            .wait()
            .map_err(|source| ReplayError::Wait {
                command: command.clone(),
                source,
            })?;
        if !status.success() && failure.is_none() {
            failure = Some(ReplayError::ProcessFailure {
                command,
                exit_code: status.code().unwrap_or(-1),
            });
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(captured),
    }
}

/// Stops processes already started when the pipe cannot be completed.
fn reap(children: &mut Vec<(String, Child)>) {
    for (_, child) in children.iter_mut() {
        let _ = child.kill();
        let _ = child.wait();
    }
    children.clear();
}
