//! The command-driving loop
//!
//! Owns one `TransactionManager` for the process lifetime and feeds it
//! every parsed line, per §4.3.1: the clock ticks once per input line,
//! including blank and comment lines, before the line is dispatched.

use crate::parser::Command;
use crate::txn::TransactionManager;

use super::args::Cli;
use super::errors::CliResult;
use super::io::{open_lines, print_lines};

/// Main CLI entry point. Parses arguments and runs the script (or
/// stdin) to completion, exiting 0 on a clean EOF.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_script(cli.script.as_deref())
}

fn run_script(script: Option<&std::path::Path>) -> CliResult<()> {
    let lines = open_lines(script)?;
    let mut manager = TransactionManager::new();

    for line in lines {
        let line = line?;
        manager.advance();
        let command = Command::parse_line(&line);
        let output = dispatch(&mut manager, command);
        print_lines(&output);
    }

    Ok(())
}

fn dispatch(manager: &mut TransactionManager, command: Command) -> Vec<String> {
    match command {
        Command::Begin(tid) => manager.begin(tid),
        Command::Read(tid, var) => manager.read(&tid, var),
        Command::Write(tid, var, value) => manager.write(&tid, var, value),
        Command::End(tid) => manager.end(&tid),
        Command::Fail(site) => manager.fail_site(site),
        Command::Recover(site) => manager.recover_site(site),
        Command::Dump => manager.dump(),
        Command::QueryState => manager.query_state(),
        Command::NoOp => Vec::new(),
        Command::Unrecognized(line) => vec![format!("Error: unrecognized command: {}", line)],
    }
}
