//! Task capability

use super::{MetricReport, TaskDescriptor};
use crate::data::{Batch, Label};
use crate::nn::Outputs;
use crate::Result;
use ndarray::Array2;

/// Batch-mean loss and its gradient with respect to the model outputs
#[derive(Debug, Clone)]
pub struct Loss {
    pub value: f32,
    pub grad: Array2<f32>,
}

/// What the run controller needs from a benchmark task
pub trait Task {
    fn descriptor(&self) -> &TaskDescriptor;

    /// Loss over a labeled batch
    fn loss(&self, outputs: &Outputs, batch: &Batch) -> Result<Loss>;

    /// One prediction per batch row, in row order
    fn extract_predictions(&self, outputs: &Outputs) -> Vec<Label>;

    /// Gold labels of a batch, in row order
    fn extract_labels(&self, batch: &Batch) -> Result<Vec<Label>>;

    fn compute_metric(&self, predictions: &[Label], labels: &[Label]) -> Result<MetricReport>;

    /// Ids of the test examples, in the order predictions are produced
    fn example_ids(&self) -> &[String];

    /// Number of test examples the task declares
    fn num_examples(&self) -> usize {
        self.example_ids().len()
    }
}
