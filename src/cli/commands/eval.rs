//! Eval command implementation

use super::session::Session;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{RunArgs, Split};
use crate::train::Phase;
use crate::{Error, Result};

pub fn run_eval(args: RunArgs, level: LogLevel) -> Result<()> {
    let session = Session::open(&args)?;
    let split = session.spec.eval.split;
    let (source, phase) = match split {
        Split::Train => (session.splits.train.as_ref(), Phase::Train),
        Split::Validation => (session.splits.validation.as_ref(), Phase::Validate),
        Split::Test => (session.splits.test.as_ref(), Phase::Test),
    };
    let Some(source) = source else {
        return Err(Error::ConfigError(format!("eval split {split:?} has no data file")));
    };

    let checkpoint = session.checkpoint()?;
    let mut controller = session.controller()?;
    controller.restore(&checkpoint)?;
    log(
        level,
        LogLevel::Normal,
        &format!("Evaluating epoch {} step {} on {split:?}", checkpoint.epoch, checkpoint.step),
    );

    let report = controller.evaluate(source, phase)?;
    for (name, value) in &report {
        log(level, LogLevel::Normal, &format!("  {name}: {value:.4}"));
    }
    Ok(())
}
