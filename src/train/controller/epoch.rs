//! Phase-level operations: train epoch, validation, test inference

use super::core::RunController;
use crate::data::{DataSource, Label};
use crate::io::{testset_predictions_path, write_predictions};
use crate::task::MetricReport;
use crate::train::{MetricAccumulator, Phase};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

impl RunController {
    /// Train one epoch, skipping the first `skip_steps` optimizer steps' batches
    ///
    /// Returns the average training loss over the batches actually run.
    pub(crate) fn train_epoch(&mut self, source: &dyn DataSource, skip_steps: usize) -> Result<f32> {
        let epoch = self.state.current_epoch;
        let accum = self.config.grad_accum.max(1);
        self.model.train_mode(true);

        let batches = source.batches(epoch);
        let num_batches = batches.len();
        let skip = (skip_steps * accum).min(num_batches);
        self.state.current_step = skip_steps;
        if skip > 0 {
            log::info!("epoch {epoch}: skipping {skip} batches already consumed");
        }

        let mut acc = MetricAccumulator::new(Phase::Train);
        let mut window = MetricAccumulator::new(Phase::Train);

        for (i, batch) in batches.iter().enumerate().skip(skip) {
            if self.interrupter.should_stop() {
                return Err(self.interrupt());
            }
            if i % accum == 0 {
                self.zero_grad();
                window = MetricAccumulator::new(Phase::Train);
            }

            let loss = self.accumulate_gradients(batch)?;
            acc.update(loss, batch.len());
            window.update(loss, batch.len());

            if (i + 1) % accum == 0 || i + 1 == num_batches {
                self.optimizer_step(window.avg_loss()?)?;
            }
        }

        acc.avg_loss()
    }

    /// Forward-only pass over a labeled split in eval mode
    pub fn evaluate(&mut self, source: &dyn DataSource, phase: Phase) -> Result<MetricReport> {
        self.model.train_mode(false);
        let mut acc = MetricAccumulator::new(phase);
        for batch in source.batches(self.state.current_epoch) {
            let outputs = self.model.forward(&batch)?;
            let loss = self.task.loss(&outputs, &batch)?;
            acc.update(loss.value, batch.len());
            acc.extend(self.task.extract_predictions(&outputs), self.task.extract_labels(&batch)?);
        }
        acc.finish(self.task.as_ref())
    }

    /// Predict every test example, keyed by the task's declared ids
    pub fn predict(&mut self, source: &dyn DataSource) -> Result<BTreeMap<String, Label>> {
        self.model.train_mode(false);
        let mut predictions = Vec::with_capacity(source.num_examples());
        for batch in source.batches(self.state.current_epoch) {
            let outputs = self.model.forward(&batch)?;
            predictions.extend(self.task.extract_predictions(&outputs));
        }

        let ids = self.task.example_ids();
        if predictions.len() != ids.len() {
            return Err(Error::CountMismatch { expected: ids.len(), actual: predictions.len() });
        }
        Ok(ids.iter().cloned().zip(predictions).collect())
    }

    /// Predict the test split and write `epoch_{e}_testset_evaluation.json`
    pub fn test_inference(&mut self, source: &dyn DataSource) -> Result<PathBuf> {
        let predictions = self.predict(source)?;
        let path = testset_predictions_path(&self.config.output_dir, self.state.current_epoch);
        write_predictions(&path, &predictions)?;
        log::info!("wrote {} test predictions to {}", predictions.len(), path.display());
        Ok(path)
    }
}
