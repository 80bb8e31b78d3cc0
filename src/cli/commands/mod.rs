//! CLI command implementations

mod eval;
mod infer;
mod session;
mod train;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};
use crate::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let log_level = LogLevel::from_cli(&cli);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Eval(args) => eval::run_eval(args, log_level),
        Command::Infer(args) => infer::run_infer(args, log_level),
    }
}
