//! Inverse square root learning rate scheduler

use super::{warn_on_mismatch, LRScheduler, ScheduleState, SchedulerKind};

/// Inverse square root schedule with linear warmup
///
/// During warmup the rate interpolates linearly from `warmup_init_lr` to
/// `lr_base`; afterwards it decays as `lr_base * sqrt(warmup_steps / t)`.
/// Both branches equal `lr_base` at `t == warmup_steps`.
///
/// Without warmup the rate is `lr_base / sqrt(max(t, 1))`.
pub struct InverseSqrtLR {
    lr_base: f32,
    warmup_steps: usize,
    warmup_init_lr: f32,
    current_step: usize,
}

impl InverseSqrtLR {
    pub fn new(lr_base: f32, warmup_steps: usize, warmup_init_lr: f32) -> Self {
        Self { lr_base, warmup_steps, warmup_init_lr, current_step: 0 }
    }

    /// Rate at an arbitrary step without mutating the scheduler
    pub fn lr_at(&self, step: usize) -> f32 {
        if self.warmup_steps == 0 {
            return self.lr_base / (step.max(1) as f32).sqrt();
        }

        let t = step as f32;
        let warmup = self.warmup_steps as f32;
        if step <= self.warmup_steps {
            self.warmup_init_lr + (self.lr_base - self.warmup_init_lr) * t / warmup
        } else {
            self.lr_base * (warmup / t).sqrt()
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl LRScheduler for InverseSqrtLR {
    fn get_lr(&self) -> f32 {
        self.lr_at(self.current_step)
    }

    fn step(&mut self) {
        self.current_step += 1;
    }

    fn state(&self) -> ScheduleState {
        ScheduleState {
            kind: SchedulerKind::InverseSqrt,
            step_count: self.current_step,
            warmup_steps: self.warmup_steps,
            base_lr: self.lr_base,
            warmup_init_lr: self.warmup_init_lr,
        }
    }

    fn load_state(&mut self, state: &ScheduleState) {
        warn_on_mismatch(&self.state(), state);
        self.current_step = state.step_count;
        self.warmup_steps = state.warmup_steps;
        self.lr_base = state.base_lr;
        self.warmup_init_lr = state.warmup_init_lr;
    }
}
