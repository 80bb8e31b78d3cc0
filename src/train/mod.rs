//! Training-run lifecycle
//!
//! This module provides the resumable run controller and its supporting
//! pieces:
//! - [`RunController`]: epoch/step loop with gradient accumulation,
//!   scheduling, periodic checkpointing and interruption handling
//! - [`MetricAccumulator`]: per-phase loss and prediction buffers
//! - [`TrainConfig`]: loop configuration and resume granularity
//! - [`Interrupter`]: shared stop flag
//!
//! # Example
//!
//! ```no_run
//! use ajustar::data::Batch;
//! use ajustar::nn::SequenceClassifier;
//! use ajustar::optim::{AdamW, LinearWarmupLR};
//! use ajustar::task::{GenericTask, MetricKind, TaskDescriptor};
//! use ajustar::train::{RunController, TrainConfig};
//!
//! # fn main() -> ajustar::Result<()> {
//! let task = GenericTask::new(
//!     TaskDescriptor::classification("sst2", &["sentence"], 2, MetricKind::Accuracy),
//!     16,
//! );
//! let model = SequenceClassifier::new(16, 32, 1, 2, 42);
//! let mut controller = RunController::new(
//!     Box::new(model),
//!     Box::new(AdamW::default_params(2e-5)),
//!     Box::new(LinearWarmupLR::new(2e-5, 10)),
//!     Box::new(task),
//!     TrainConfig::new().with_epochs(3).with_grad_accum(2),
//! );
//! let train: Vec<Batch> = vec![];
//! let result = controller.run(&train, None, None)?;
//! println!("finished epoch {} with loss {:.4}", result.final_epoch, result.final_loss);
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod interrupt;
mod metrics;

pub use config::{ResumeGranularity, TrainConfig};
pub use controller::{RunController, RunState, TrainResult};
pub use interrupt::Interrupter;
pub use metrics::{MetricAccumulator, Phase};
