//! Named trainable parameter with an accumulated gradient buffer

use ndarray::Array2;

/// A named 2-D parameter matrix with its gradient
///
/// Gradients accumulate across `accumulate_grad` calls until `zero_grad`,
/// which is what lets the run controller sum several micro-batches into one
/// optimizer step. Frozen parameters (`requires_grad == false`) never receive
/// gradient and are skipped by optimizers.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    value: Array2<f32>,
    grad: Array2<f32>,
    requires_grad: bool,
}

impl Param {
    /// Create a parameter with a zeroed gradient of the same shape
    pub fn new(name: impl Into<String>, value: Array2<f32>, requires_grad: bool) -> Self {
        let grad = Array2::zeros(value.raw_dim());
        Self { name: name.into(), value, grad, requires_grad }
    }

    /// Fully-qualified dotted name, e.g. `encoder.layer.0.dense.weight`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Array2<f32> {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Array2<f32> {
        &mut self.value
    }

    pub fn grad(&self) -> &Array2<f32> {
        &self.grad
    }

    pub fn grad_mut(&mut self) -> &mut Array2<f32> {
        &mut self.grad
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    /// `[rows, cols]`
    pub fn shape(&self) -> [usize; 2] {
        let (r, c) = self.value.dim();
        [r, c]
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Reset the gradient buffer to zero
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// Add `delta` into the gradient buffer if the parameter is trainable
    pub fn accumulate_grad(&mut self, delta: &Array2<f32>) {
        if self.requires_grad {
            self.grad += delta;
        }
    }
}
