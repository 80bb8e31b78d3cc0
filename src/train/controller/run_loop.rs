//! Multi-epoch run loop

use super::core::RunController;
use super::result::TrainResult;
use crate::data::DataSource;
use crate::task::MetricReport;
use crate::train::Phase;
use crate::Result;
use std::time::Instant;

impl RunController {
    /// Run from the configured start (or the latest checkpoint) to completion
    ///
    /// Per epoch: train, validate (if a validation split is given), save a
    /// checkpoint, then predict the test split (if given).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`](crate::Error::Interrupted) after a
    /// best-effort checkpoint when the interrupter fires; any fatal error
    /// from the collaborators is propagated unchanged.
    pub fn run(
        &mut self,
        train: &dyn DataSource,
        validation: Option<&dyn DataSource>,
        test: Option<&dyn DataSource>,
    ) -> Result<TrainResult> {
        self.start_time = Some(Instant::now());
        self.state = Default::default();
        self.resumed_from = None;
        self.last_saved = None;
        let start = self.initialize(train)?;
        if let Some((epoch, step)) = self.resumed_from {
            self.state.current_epoch = epoch;
            self.state.current_step = step;
        }

        let mut final_loss = 0.0;
        let mut best_val_loss: Option<f32> = None;
        let mut val_metrics = MetricReport::new();
        let mut prediction_files = Vec::new();

        for epoch in start.epoch..self.config.epochs {
            self.state.current_epoch = epoch;
            self.state.current_step = 0;
            if self.interrupter.should_stop() {
                return Err(self.interrupt());
            }

            let skip = if epoch == start.epoch { start.skip_steps } else { 0 };
            final_loss = self.train_epoch(train, skip)?;
            let mut summary = MetricReport::from([("train/epoch_loss".to_string(), f64::from(final_loss))]);

            if let Some(source) = validation {
                val_metrics = self.evaluate(source, Phase::Validate)?;
                if let Some(&loss) = val_metrics.get("val/loss") {
                    let loss = loss as f32;
                    best_val_loss = Some(best_val_loss.map_or(loss, |b| b.min(loss)));
                }
                summary.extend(val_metrics.clone());
            }

            self.save_checkpoint()?;

            if let Some(source) = test {
                prediction_files.push(self.test_inference(source)?);
            }

            log::info!(
                "epoch {epoch} done: {} optimizer steps, {}",
                self.state.current_step,
                summary.iter().map(|(k, v)| format!("{k}={v:.4}")).collect::<Vec<_>>().join(", ")
            );
            self.report(&summary)?;
        }

        self.logger.finish()?;
        Ok(TrainResult {
            final_epoch: self.state.current_epoch,
            final_step: self.state.current_step,
            global_step: self.global_step,
            final_loss,
            best_val_loss,
            val_metrics,
            prediction_files,
            resumed_from: self.resumed_from,
            elapsed_secs: self.elapsed_secs(),
        })
    }
}
