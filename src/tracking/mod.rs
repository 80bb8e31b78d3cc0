//! Experiment tracking
//!
//! The run controller reports every optimizer step and every phase summary
//! to an [`ExperimentLogger`]. Loggers are write-only sinks: swapping one for
//! [`NoopLogger`] never changes training behavior.
//!
//! # Example
//!
//! ```
//! use ajustar::tracking::{ExperimentLogger, InMemoryLogger};
//! use std::collections::BTreeMap;
//!
//! let mut logger = InMemoryLogger::new();
//! let handle = logger.clone();
//! logger.log(1, &BTreeMap::from([("train/loss".to_string(), 0.7)])).unwrap();
//! assert_eq!(handle.records()[0].metrics["train/loss"], 0.7);
//! ```

mod jsonl;
mod memory;


pub use jsonl::JsonlLogger;
pub use memory::InMemoryLogger;

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One logged set of metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Global optimizer step at the time of logging
    pub step: usize,
    pub timestamp: DateTime<Utc>,
    pub metrics: BTreeMap<String, f64>,
}

impl LogRecord {
    pub fn new(step: usize, metrics: &BTreeMap<String, f64>) -> Self {
        Self { step, timestamp: Utc::now(), metrics: metrics.clone() }
    }
}

/// Sink for scalar metrics keyed by name
pub trait ExperimentLogger {
    fn log(&mut self, step: usize, metrics: &BTreeMap<String, f64>) -> Result<()>;

    /// Flush buffered output; called when a run ends
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl ExperimentLogger for NoopLogger {
    fn log(&mut self, _step: usize, _metrics: &BTreeMap<String, f64>) -> Result<()> {
        Ok(())
    }
}
