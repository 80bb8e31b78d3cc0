//! Infer command implementation

use super::session::Session;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::RunArgs;
use crate::io::{read_predictions, write_submission_tsv};
use crate::{Error, Result};

pub fn run_infer(args: RunArgs, level: LogLevel) -> Result<()> {
    let session = Session::open(&args)?;
    let Some(test) = &session.splits.test else {
        return Err(Error::ConfigError("infer command needs data.test".into()));
    };

    let checkpoint = session.checkpoint()?;
    let mut controller = session.controller()?;
    controller.restore(&checkpoint)?;

    let path = controller.test_inference(test)?;
    log(level, LogLevel::Normal, &format!("Predictions written to {}", path.display()));

    if let Some(submission) = &session.spec.eval.submission {
        let predictions = read_predictions(&path)?;
        write_submission_tsv(submission, &predictions, &session.descriptor.label_names)?;
        log(level, LogLevel::Normal, &format!("Submission written to {}", submission.display()));
    }
    Ok(())
}
