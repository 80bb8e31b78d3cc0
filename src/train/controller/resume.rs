//! Restoring a run from the checkpoint store

use super::core::RunController;
use crate::checkpoint::Checkpoint;
use crate::data::DataSource;
use crate::train::ResumeGranularity;
use crate::Result;

/// Where training continues after initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StartPosition {
    pub epoch: usize,
    /// Optimizer steps of `epoch` to skip
    pub skip_steps: usize,
}

impl RunController {
    /// Load a checkpoint's weights, optimizer and schedule into this controller
    ///
    /// The run position moves to the checkpoint's `(epoch, step)`.
    pub fn restore(&mut self, ckpt: &Checkpoint) -> Result<()> {
        self.model.load_state(&ckpt.model_weights)?;
        self.optimizer.load_state(&ckpt.optimizer_state)?;
        self.scheduler.load_state(&ckpt.schedule_state);
        self.scheduler.apply(self.optimizer.as_mut());
        self.state.current_epoch = ckpt.epoch;
        self.state.current_step = ckpt.step;
        self.resumed_from = Some(ckpt.position());
        Ok(())
    }

    /// Load the latest checkpoint if resuming is enabled
    ///
    /// A checkpoint that closed its epoch resumes at the next epoch. With
    /// [`ResumeGranularity::Step`] a mid-epoch checkpoint skips the batches
    /// it already consumed. With [`ResumeGranularity::Epoch`] only epoch
    /// boundaries (step 0, or a closed epoch) are eligible, so the resumed
    /// run never trains a batch twice.
    pub(crate) fn initialize(&mut self, train: &dyn DataSource) -> Result<StartPosition> {
        let fresh = StartPosition { epoch: 0, skip_steps: 0 };
        if !self.config.resume_from_checkpoint {
            return Ok(fresh);
        }
        let Some(store) = &self.store else {
            log::warn!("resume requested without a checkpoint store; starting fresh");
            return Ok(fresh);
        };
        let steps_per_epoch = self.config.steps_per_epoch(train.num_batches());
        let latest = match self.config.resume_granularity {
            ResumeGranularity::Step => store.load_latest()?,
            ResumeGranularity::Epoch => {
                store.load_latest_where(|_, step| step == 0 || step >= steps_per_epoch)?
            }
        };
        let Some(ckpt) = latest else {
            log::info!("no usable checkpoint in {}; starting fresh", store.dir().display());
            return Ok(fresh);
        };

        self.restore(&ckpt)?;
        self.last_saved = Some(ckpt.position());
        self.global_step = ckpt.epoch * steps_per_epoch + ckpt.step;

        let position = if ckpt.step >= steps_per_epoch {
            StartPosition { epoch: ckpt.epoch + 1, skip_steps: 0 }
        } else {
            StartPosition { epoch: ckpt.epoch, skip_steps: ckpt.step }
        };
        log::info!(
            "resumed from epoch {} step {}; continuing at epoch {} step {} (lr={:.3e})",
            ckpt.epoch,
            ckpt.step,
            position.epoch,
            position.skip_steps,
            self.optimizer.lr()
        );
        Ok(position)
    }
}
