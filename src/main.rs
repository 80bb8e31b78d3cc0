//! Ajustar CLI
//!
//! Entry point for fine-tuning runs described by a YAML run specification.
//!
//! # Usage
//!
//! ```bash
//! # Train, resuming from the latest checkpoint when the config asks for it
//! ajustar train --config-path run.yaml
//!
//! # Train with overrides
//! ajustar train --config-path run.yaml --epochs 10 --lr 0.001 --resume
//!
//! # Score a checkpoint on the configured split
//! ajustar eval --config-path run.yaml
//!
//! # Predict the test split and write a submission file
//! ajustar infer --config-path run.yaml
//! ```

use ajustar::cli::{run_command, Cli, LogLevel};
use clap::Parser;
use std::process::ExitCode;

/// Conventional exit status after SIGINT
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = LogLevel::from_cli(&cli);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.env_filter())).init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_interrupted() => {
            eprintln!("{e}; resume with --resume");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
