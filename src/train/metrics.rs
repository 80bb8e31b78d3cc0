//! Streaming loss and prediction accumulation per phase

use crate::data::Label;
use crate::task::{MetricReport, Task};
use crate::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Validate,
    Test,
}

impl Phase {
    /// Key prefix used when reporting, e.g. `val/loss`
    pub fn prefix(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Validate => "val",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Loss sum, sample count and ordered prediction/label buffers for one phase
#[derive(Debug, Clone)]
pub struct MetricAccumulator {
    phase: Phase,
    sum_loss: f64,
    sample_count: usize,
    predictions: Vec<Label>,
    labels: Vec<Label>,
}

impl MetricAccumulator {
    pub fn new(phase: Phase) -> Self {
        Self { phase, sum_loss: 0.0, sample_count: 0, predictions: Vec::new(), labels: Vec::new() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Add a batch-mean loss weighted by the batch size
    pub fn update(&mut self, loss: f32, batch_size: usize) {
        self.sum_loss += f64::from(loss) * batch_size as f64;
        self.sample_count += batch_size;
    }

    pub fn extend(&mut self, predictions: Vec<Label>, labels: Vec<Label>) {
        self.predictions.extend(predictions);
        self.labels.extend(labels);
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn avg_loss(&self) -> Result<f32> {
        if self.sample_count == 0 {
            return Err(Error::EmptyPhase { phase: self.phase.to_string() });
        }
        Ok((self.sum_loss / self.sample_count as f64) as f32)
    }

    /// `{prefix}/loss` plus the task metrics, when predictions were collected
    pub fn finish(self, task: &dyn Task) -> Result<MetricReport> {
        let prefix = self.phase.prefix();
        let mut report = MetricReport::new();
        report.insert(format!("{prefix}/loss"), f64::from(self.avg_loss()?));
        if !self.predictions.is_empty() {
            for (name, value) in task.compute_metric(&self.predictions, &self.labels)? {
                report.insert(format!("{prefix}/{name}"), value);
            }
        }
        Ok(report)
    }
}
