use anyhow::Result;

use darts_sync::cli::Command;
use darts_sync::{handle_completions, handle_init_db, handle_lookup, handle_sync, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Sync { keyword, json } => handle_sync(keyword, *json),
        Command::Lookup {
            keyword,
            nickname,
            cap,
            json,
        } => handle_lookup(keyword, nickname, *cap, *json),
        Command::InitDb => handle_init_db(),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
