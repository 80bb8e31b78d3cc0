//! Learning rate schedulers
//!
//! Provides warmup-based learning rate schedules for fine-tuning:
//! - `LinearWarmupLR` - Linear warmup from `warmup_init_lr` to target, then constant
//! - `InverseSqrtLR` - Linear warmup, then decay proportional to `1/sqrt(step)`
//!
//! The rate is a pure function of [`ScheduleState`], so persisting the state
//! in a checkpoint and restoring it replays the exact same rate sequence.

mod inverse_sqrt;
mod linear_warmup;


pub use inverse_sqrt::InverseSqrtLR;
pub use linear_warmup::LinearWarmupLR;

use crate::optim::Optimizer;
use serde::{Deserialize, Serialize};

/// Rate used at step 0 when no explicit floor is configured
pub const DEFAULT_WARMUP_INIT_LR: f32 = 1e-10;

/// Which schedule policy to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulerKind {
    #[default]
    #[serde(alias = "linear", alias = "LinearLR", alias = "linear_warmup")]
    Linear,
    #[serde(alias = "inverse_sqrt", alias = "inverse-sqrt", alias = "inversesqrt")]
    InverseSqrt,
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerKind::Linear => write!(f, "Linear"),
            SchedulerKind::InverseSqrt => write!(f, "InverseSqrt"),
        }
    }
}

/// Persisted schedule position and configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub kind: SchedulerKind,
    pub step_count: usize,
    pub warmup_steps: usize,
    pub base_lr: f32,
    pub warmup_init_lr: f32,
}

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Advance the schedule by one optimizer step
    fn step(&mut self);

    /// Snapshot of the schedule for checkpointing
    fn state(&self) -> ScheduleState;

    /// Restore a snapshot produced by [`LRScheduler::state`]
    fn load_state(&mut self, state: &ScheduleState);

    /// Write the current learning rate into an optimizer
    fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}

/// Number of warmup steps for a run
///
/// `total = ceil(train_batches / grad_accum) * epochs`, warmup is
/// `floor(total * warmup_ratio)`.
pub fn warmup_steps_for(
    train_batches: usize,
    grad_accum: usize,
    epochs: usize,
    warmup_ratio: f32,
) -> usize {
    let steps_per_epoch = train_batches.div_ceil(grad_accum.max(1));
    let total = steps_per_epoch * epochs;
    // Nudge before flooring so ratios like 0.06 are not lost to f32 rounding
    (total as f64 * f64::from(warmup_ratio) + 1e-6).floor() as usize
}

/// Build a boxed scheduler of the requested kind
pub fn build_scheduler(
    kind: SchedulerKind,
    base_lr: f32,
    warmup_steps: usize,
    warmup_init_lr: f32,
) -> Box<dyn LRScheduler> {
    match kind {
        SchedulerKind::Linear => {
            Box::new(LinearWarmupLR::with_init_lr(base_lr, warmup_steps, warmup_init_lr))
        }
        SchedulerKind::InverseSqrt => {
            Box::new(InverseSqrtLR::new(base_lr, warmup_steps, warmup_init_lr))
        }
    }
}

/// Log any difference between a restored state and the configured schedule
pub(crate) fn warn_on_mismatch(configured: &ScheduleState, restored: &ScheduleState) {
    if configured.kind != restored.kind {
        log::warn!(
            "checkpoint schedule kind {} differs from configured {}; keeping {}",
            restored.kind,
            configured.kind,
            configured.kind
        );
    }
    if configured.warmup_steps != restored.warmup_steps
        || configured.base_lr != restored.base_lr
        || configured.warmup_init_lr != restored.warmup_init_lr
    {
        log::warn!(
            "checkpoint schedule (base_lr={}, warmup={}) differs from configuration \
             (base_lr={}, warmup={}); using checkpoint values",
            restored.base_lr,
            restored.warmup_steps,
            configured.base_lr,
            configured.warmup_steps
        );
    }
}
