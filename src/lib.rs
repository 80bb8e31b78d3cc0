//! # ajustar
//!
//! Fine-tuning run controller for sequence classification and span
//! extraction tasks, with optional LoRA adapters.
//!
//! ## Architecture
//!
//! - `optim`: optimizers (AdamW, SGD), gradient clipping, warmup schedules
//! - `nn`: parameters, linear layers, reference classifier model
//! - `lora`: low-rank adapters with merge/unmerge and injection
//! - `task`: task descriptors, GLUE/SQuAD metrics, task registry
//! - `data`: JSONL examples and batching
//! - `checkpoint`: atomic checkpoint store with latest resolution
//! - `train`: metric accumulation and the run controller
//! - `tracking`: experiment loggers
//! - `config`: YAML run specification, validation and CLI types
//! - `io`: model state and prediction files
//!
//! ## Example
//!
//! ```no_run
//! use ajustar::config::load_config;
//!
//! let spec = load_config("run.yaml")?;
//! println!("task: {}", spec.task.name);
//! # Ok::<(), ajustar::Error>(())
//! ```

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod lora;
pub mod nn;
pub mod optim;
pub mod task;
pub mod tracking;
pub mod train;

pub use error::{Error, Result};
