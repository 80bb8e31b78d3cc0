//! Run result types

use crate::task::MetricReport;
use std::path::PathBuf;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct TrainResult {
    /// Last epoch trained
    pub final_epoch: usize,
    /// Optimizer steps taken in the last epoch
    pub final_step: usize,
    pub global_step: usize,
    /// Average training loss of the last epoch
    pub final_loss: f32,
    /// Lowest validation loss over the run
    pub best_val_loss: Option<f32>,
    /// Validation report of the last epoch
    pub val_metrics: MetricReport,
    /// Per-epoch test prediction files
    pub prediction_files: Vec<PathBuf>,
    /// `(epoch, step)` of the checkpoint the run resumed from
    pub resumed_from: Option<(usize, usize)>,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}
