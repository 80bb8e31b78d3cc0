//! Optimizers and learning rate schedules for fine-tuning

mod adamw;
mod clip;
mod optimizer;
mod scheduler;
mod sgd;

pub use adamw::{AdamW, AdamWState};
pub use clip::clip_grad_norm;
pub use optimizer::Optimizer;
pub use scheduler::{
    build_scheduler, warmup_steps_for, InverseSqrtLR, LRScheduler, LinearWarmupLR,
    ScheduleState, SchedulerKind, DEFAULT_WARMUP_INIT_LR,
};
pub use sgd::SGD;
