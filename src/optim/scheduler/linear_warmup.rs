//! Linear warmup learning rate scheduler

use super::{warn_on_mismatch, LRScheduler, ScheduleState, SchedulerKind, DEFAULT_WARMUP_INIT_LR};

/// Linear Warmup Learning Rate Scheduler
///
/// Linearly increases learning rate from `warmup_init_lr` to target over
/// warmup_steps. After warmup, maintains target learning rate.
///
/// Formula: lr_t = max(lr_target * min(1, t / warmup_steps), warmup_init_lr)
pub struct LinearWarmupLR {
    lr_target: f32,
    warmup_steps: usize,
    warmup_init_lr: f32,
    current_step: usize,
}

impl LinearWarmupLR {
    /// Create a new linear warmup scheduler
    ///
    /// # Arguments
    /// * `lr_target` - Target learning rate after warmup
    /// * `warmup_steps` - Number of steps for warmup
    pub fn new(lr_target: f32, warmup_steps: usize) -> Self {
        Self::with_init_lr(lr_target, warmup_steps, DEFAULT_WARMUP_INIT_LR)
    }

    /// Create a scheduler with an explicit floor for the warmup ramp
    pub fn with_init_lr(lr_target: f32, warmup_steps: usize, warmup_init_lr: f32) -> Self {
        Self { lr_target, warmup_steps, warmup_init_lr, current_step: 0 }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl LRScheduler for LinearWarmupLR {
    fn get_lr(&self) -> f32 {
        if self.warmup_steps == 0 {
            return self.lr_target;
        }

        let progress = (self.current_step as f32 / self.warmup_steps as f32).min(1.0);
        (self.lr_target * progress).max(self.warmup_init_lr)
    }

    fn step(&mut self) {
        self.current_step += 1;
    }

    fn state(&self) -> ScheduleState {
        ScheduleState {
            kind: SchedulerKind::Linear,
            step_count: self.current_step,
            warmup_steps: self.warmup_steps,
            base_lr: self.lr_target,
            warmup_init_lr: self.warmup_init_lr,
        }
    }

    fn load_state(&mut self, state: &ScheduleState) {
        warn_on_mismatch(&self.state(), state);
        self.current_step = state.step_count;
        self.warmup_steps = state.warmup_steps;
        self.lr_target = state.base_lr;
        self.warmup_init_lr = state.warmup_init_lr;
    }
}
