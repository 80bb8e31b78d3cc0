//! Per-batch and per-optimizer-step operations

use super::core::RunController;
use crate::data::Batch;
use crate::optim::clip_grad_norm;
use crate::Result;
use std::collections::BTreeMap;

impl RunController {
    /// Forward, loss and backward for one batch; gradients accumulate
    ///
    /// The loss gradient is scaled by `1 / grad_accum` so an accumulation
    /// window sums to the mean over its batches.
    pub(crate) fn accumulate_gradients(&mut self, batch: &Batch) -> Result<f32> {
        let outputs = self.model.forward(batch)?;
        let loss = self.task.loss(&outputs, batch)?;
        let scale = 1.0 / self.config.grad_accum.max(1) as f32;
        self.model.backward(&(loss.grad * scale))?;
        Ok(loss.value)
    }

    pub(crate) fn zero_grad(&mut self) {
        let mut params = self.model.parameters_mut();
        self.optimizer.zero_grad(&mut params);
    }

    /// Clip, update, advance the schedule and the step counters
    ///
    /// Saves a checkpoint when `current_step` reaches a multiple of
    /// `checkpoint_steps`.
    pub(crate) fn optimizer_step(&mut self, window_loss: f32) -> Result<()> {
        let grad_norm = {
            let mut params = self.model.parameters_mut();
            let norm = self.config.max_grad_norm.map(|max| clip_grad_norm(&mut params, max));
            self.optimizer.step(&mut params);
            norm
        };
        let lr_used = self.optimizer.lr();
        self.scheduler.step();
        self.scheduler.apply(self.optimizer.as_mut());

        self.state.current_step += 1;
        self.global_step += 1;

        log::debug!(
            "epoch {} step {} (global {}): loss={window_loss:.4}, lr={lr_used:.3e}",
            self.state.current_epoch,
            self.state.current_step,
            self.global_step
        );
        let mut metrics = BTreeMap::from([
            ("train/loss".to_string(), f64::from(window_loss)),
            ("train/lr".to_string(), f64::from(lr_used)),
        ]);
        if let Some(norm) = grad_norm {
            metrics.insert("train/grad_norm".to_string(), f64::from(norm));
        }
        self.report(&metrics)?;

        let every = self.config.checkpoint_steps;
        if every > 0 && self.state.current_step % every == 0 {
            self.save_checkpoint()?;
        }
        Ok(())
    }
}
