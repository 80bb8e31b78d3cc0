//! Run controller: the resumable fine-tuning state machine
//!
//! The controller drives epochs of train → validate → checkpoint → test
//! inference over injected collaborators:
//! - a [`Model`](crate::nn::Model) providing forward/backward,
//! - an [`Optimizer`](crate::optim::Optimizer) and an
//!   [`LRScheduler`](crate::optim::LRScheduler),
//! - a [`Task`](crate::task::Task) providing loss, decoding and metrics,
//! - an optional [`CheckpointStore`](crate::checkpoint::CheckpointStore)
//!   and an [`ExperimentLogger`](crate::tracking::ExperimentLogger).
//!
//! Gradient accumulation groups `grad_accum` batches into one optimizer step;
//! `current_step` counts optimizer steps within the current epoch.
//! Interruption is honored between batches: the controller saves one
//! checkpoint of its in-memory state and returns
//! [`Error::Interrupted`](crate::Error::Interrupted).

mod core;
mod epoch;
mod result;
mod resume;
mod run_loop;
mod step;

#[cfg(test)]
mod tests;

pub use core::{RunController, RunState};
pub use result::TrainResult;
