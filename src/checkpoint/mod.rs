//! Durable run snapshots
//!
//! A [`Checkpoint`] bundles model weights, optimizer state and schedule
//! state at one `(epoch, step)` position. [`CheckpointStore`] writes each
//! snapshot atomically and resolves the newest valid one on resume.

mod store;


pub use store::{Checkpoint, CheckpointStore};
