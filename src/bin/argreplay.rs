use argrecord::app::command_handlers;

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = command_handlers::execute_cli(args)?;
    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }
    if outcome.succeeded() {
        Ok(())
    } else {
        Err(outcome.failures.join("\n"))
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("argreplay: {err}");
        std::process::exit(1);
    }
}
