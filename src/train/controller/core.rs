//! Core RunController struct and accessors

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::nn::Model;
use crate::optim::{LRScheduler, Optimizer};
use crate::task::Task;
use crate::tracking::{ExperimentLogger, NoopLogger};
use crate::train::{Interrupter, TrainConfig};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

/// Position of a run, owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub current_epoch: usize,
    /// Optimizer steps taken in the current epoch
    pub current_step: usize,
    pub is_interrupted: bool,
}

/// Orchestrates training, validation, checkpointing and test inference
pub struct RunController {
    pub(crate) model: Box<dyn Model>,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) scheduler: Box<dyn LRScheduler>,
    pub(crate) task: Box<dyn Task>,
    pub(crate) logger: Box<dyn ExperimentLogger>,
    pub(crate) store: Option<CheckpointStore>,
    pub(crate) config: TrainConfig,
    pub(crate) interrupter: Interrupter,
    pub(crate) state: RunState,
    /// Optimizer steps across all epochs, for progress reporting
    pub(crate) global_step: usize,
    pub(crate) resumed_from: Option<(usize, usize)>,
    /// Position already present in the store for this run
    pub(crate) last_saved: Option<(usize, usize)>,
    pub(crate) start_time: Option<Instant>,
}

impl RunController {
    /// Create a controller and write the schedule's initial rate into the optimizer
    pub fn new(
        model: Box<dyn Model>,
        mut optimizer: Box<dyn Optimizer>,
        scheduler: Box<dyn LRScheduler>,
        task: Box<dyn Task>,
        config: TrainConfig,
    ) -> Self {
        scheduler.apply(optimizer.as_mut());
        Self {
            model,
            optimizer,
            scheduler,
            task,
            logger: Box::new(NoopLogger),
            store: None,
            config,
            interrupter: Interrupter::new(),
            state: RunState::default(),
            global_step: 0,
            resumed_from: None,
            last_saved: None,
            start_time: None,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn ExperimentLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_store(mut self, store: CheckpointStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Share an interruption flag, e.g. one set from a Ctrl-C handler
    pub fn with_interrupter(mut self, interrupter: Interrupter) -> Self {
        self.interrupter = interrupter;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn global_step(&self) -> usize {
        self.global_step
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    pub fn scheduler(&self) -> &dyn LRScheduler {
        self.scheduler.as_ref()
    }

    pub fn task(&self) -> &dyn Task {
        self.task.as_ref()
    }

    pub fn interrupter(&self) -> &Interrupter {
        &self.interrupter
    }

    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Snapshot of the in-memory state at the current position
    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint::new(
            self.state.current_epoch,
            self.state.current_step,
            self.model.state(),
            self.optimizer.state(),
            self.scheduler.state(),
        )
    }

    /// Save a checkpoint if a store is configured
    ///
    /// A position already written (by this run, or by an earlier one) is
    /// not written again; existing entries keep their content.
    pub(crate) fn save_checkpoint(&mut self) -> Result<Option<PathBuf>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let position = (self.state.current_epoch, self.state.current_step);
        if self.last_saved == Some(position) {
            return Ok(None);
        }
        let saved = match store.save(&self.snapshot()) {
            Ok(path) => Some(path),
            Err(Error::CheckpointExists { path }) => {
                log::warn!("keeping existing checkpoint {path}");
                None
            }
            Err(e) => return Err(e),
        };
        self.last_saved = Some(position);
        Ok(saved)
    }

    /// Best-effort save, then the interruption error
    pub(crate) fn interrupt(&mut self) -> Error {
        self.state.is_interrupted = true;
        let RunState { current_epoch: epoch, current_step: step, .. } = self.state;
        log::warn!("interrupted at epoch {epoch} step {step}, saving checkpoint");
        if let Err(e) = self.save_checkpoint() {
            log::error!("checkpoint on interrupt failed: {e}");
        }
        Error::Interrupted { epoch, step }
    }

    pub(crate) fn report(&mut self, metrics: &BTreeMap<String, f64>) -> Result<()> {
        self.logger.log(self.global_step, metrics)
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64())
    }
}
