//! Model capability used by the run controller

use super::Param;
use crate::data::Batch;
use crate::io::ModelState;
use crate::Result;
use ndarray::Array2;

/// Raw model outputs for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct Outputs {
    /// `[batch, output_width]`
    pub logits: Array2<f32>,
}

/// Forward/backward capability of a trainable model
///
/// `train_mode(false)` switches to inference (adapters merge) and
/// `train_mode(true)` back to training (adapters unmerge). `state` always
/// reports weights in their unmerged form so a checkpoint taken in either
/// mode restores identically.
pub trait Model {
    /// Registry name of the architecture
    fn name(&self) -> &str;

    fn forward(&mut self, batch: &Batch) -> Result<Outputs>;

    /// Backpropagate the gradient of the loss w.r.t. the logits of the last
    /// forward, accumulating into parameter gradients
    fn backward(&mut self, grad_logits: &Array2<f32>) -> Result<()>;

    fn train_mode(&mut self, training: bool);

    fn is_training(&self) -> bool;

    fn parameters(&self) -> Vec<&Param>;

    fn parameters_mut(&mut self) -> Vec<&mut Param>;

    fn state(&self) -> ModelState;

    fn load_state(&mut self, state: &ModelState) -> Result<()>;

    /// Number of trainable scalars
    fn num_trainable_parameters(&self) -> usize {
        self.parameters().iter().filter(|p| p.requires_grad()).map(|p| p.len()).sum()
    }
}
