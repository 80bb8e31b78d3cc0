//! In-memory logger for tests and notebooks

use super::{ExperimentLogger, LogRecord};
use crate::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Keeps every record; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl InMemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Every logged value of one metric, in logging order
    pub fn series(&self, key: &str) -> Vec<(usize, f64)> {
        self.records()
            .into_iter()
            .filter_map(|r| r.metrics.get(key).map(|&v| (r.step, v)))
            .collect()
    }
}

impl ExperimentLogger for InMemoryLogger {
    fn log(&mut self, step: usize, metrics: &BTreeMap<String, f64>) -> Result<()> {
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord::new(step, metrics));
        }
        Ok(())
    }
}
