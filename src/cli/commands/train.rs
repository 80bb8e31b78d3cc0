//! Train command implementation

use super::session::Session;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::RunArgs;
use crate::data::DataSource;
use crate::train::Interrupter;
use crate::{Error, Result};

pub fn run_train(args: RunArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!("Ajustar: Training from {}", args.config_path.display()),
    );

    let session = Session::open(&args)?;
    let spec = &session.spec;
    let Some(train) = &session.splits.train else {
        return Err(Error::ConfigError("train command needs data.train".into()));
    };

    log(level, LogLevel::Verbose, &format!("  Task: {} ({})", spec.task.name, spec.task.model));
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Schedule: {} (lr={}, warmup_ratio={})",
            spec.train.scheduler, spec.train.learning_rate, spec.train.warmup_ratio
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Epochs: {}, batch {} x {} accumulation",
            spec.train.epochs, spec.train.train_batch, spec.train.grad_accum
        ),
    );
    if let Some(lora) = &spec.task.lora {
        log(level, LogLevel::Verbose, &format!("  LoRA: rank={}, alpha={}", lora.rank, lora.alpha));
    }

    let interrupter = Interrupter::new();
    let handle = interrupter.clone();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        log::warn!("could not install Ctrl-C handler: {e}");
    }

    let mut controller = session.controller()?.with_interrupter(interrupter);
    let validation = session.splits.validation.as_ref().map(|s| s as &dyn DataSource);
    let test = session.splits.test.as_ref().map(|s| s as &dyn DataSource);
    let result = controller.run(train, validation, test)?;

    if let Some((epoch, step)) = result.resumed_from {
        log(level, LogLevel::Normal, &format!("Resumed from epoch {epoch} step {step}"));
    }
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} steps, final loss {:.4} ({:.1}s)",
            result.global_step, result.final_loss, result.elapsed_secs
        ),
    );
    for (name, value) in &result.val_metrics {
        log(level, LogLevel::Normal, &format!("  {name}: {value:.4}"));
    }
    for path in &result.prediction_files {
        log(level, LogLevel::Verbose, &format!("  predictions: {}", path.display()));
    }
    Ok(())
}
