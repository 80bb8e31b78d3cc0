//! Run controller configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a run positions itself after loading a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeGranularity {
    /// Replay the checkpoint's epoch from its first batch, or start the
    /// next epoch if the checkpoint closed its epoch
    #[default]
    Epoch,
    /// Skip the batches the checkpoint already consumed
    Step,
}

/// Training loop configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    /// Batches per optimizer step
    pub grad_accum: usize,
    /// Save every N optimizer steps within an epoch
    pub checkpoint_steps: usize,
    pub max_grad_norm: Option<f32>,
    pub resume_from_checkpoint: bool,
    pub resume_granularity: ResumeGranularity,
    /// Where per-epoch test predictions are written
    pub output_dir: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            grad_accum: 1,
            checkpoint_steps: 1000,
            max_grad_norm: None,
            resume_from_checkpoint: false,
            resume_granularity: ResumeGranularity::Epoch,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_grad_accum(mut self, steps: usize) -> Self {
        self.grad_accum = steps.max(1);
        self
    }

    pub fn with_checkpoint_steps(mut self, steps: usize) -> Self {
        self.checkpoint_steps = steps;
        self
    }

    pub fn with_grad_clip(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = Some(max_norm);
        self
    }

    pub fn with_resume(mut self, granularity: ResumeGranularity) -> Self {
        self.resume_from_checkpoint = true;
        self.resume_granularity = granularity;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Optimizer steps one epoch of `train_batches` produces
    pub fn steps_per_epoch(&self, train_batches: usize) -> usize {
        train_batches.div_ceil(self.grad_accum.max(1))
    }
}
