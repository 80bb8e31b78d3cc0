//! Command-line argument types

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::schema::RunSpec;

/// Ajustar: resumable fine-tuning runs with LoRA adapters
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ajustar")]
#[command(version)]
#[command(about = "Fine-tune sequence classifiers with checkpointed, resumable runs")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train (or resume training) from a YAML run specification
    Train(RunArgs),

    /// Evaluate a checkpoint on a labeled split
    Eval(RunArgs),

    /// Predict the test split from a checkpoint
    Infer(RunArgs),
}

/// Arguments shared by every command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Path to YAML run specification
    #[arg(long, value_name = "FILE")]
    pub config_path: PathBuf,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    pub lr: Option<f32>,

    /// Override checkpoint directory
    #[arg(long)]
    pub checkpoint_path: Option<PathBuf>,

    /// Resume from the latest checkpoint in the checkpoint directory
    #[arg(long)]
    pub resume: bool,

    /// Override random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parse arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a run specification
pub fn apply_overrides(spec: &mut RunSpec, args: &RunArgs) {
    if let Some(output_dir) = &args.output_dir {
        spec.train.output_dir.clone_from(output_dir);
    }
    if let Some(epochs) = args.epochs {
        spec.train.epochs = epochs;
    }
    if let Some(lr) = args.lr {
        spec.train.learning_rate = lr;
    }
    if let Some(path) = &args.checkpoint_path {
        spec.train.checkpoint_path = Some(path.clone());
    }
    if args.resume {
        spec.train.resume_from_checkpoint = true;
    }
    if let Some(seed) = args.seed {
        spec.train.seed = seed;
    }
}
