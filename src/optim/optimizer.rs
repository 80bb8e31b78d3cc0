//! Optimizer trait

use crate::nn::Param;
use crate::Result;

/// Trait for optimization algorithms
///
/// Optimizers operate on borrowed parameters collected from a model. Frozen
/// parameters are skipped. `state`/`load_state` expose everything needed to
/// resume an interrupted run with identical update dynamics.
pub trait Optimizer {
    /// Apply one update to every trainable parameter from its accumulated gradient
    fn step(&mut self, params: &mut [&mut Param]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [&mut Param]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Serializable optimizer state (moments, step counters)
    fn state(&self) -> serde_json::Value;

    /// Restore state produced by [`Optimizer::state`]
    fn load_state(&mut self, state: &serde_json::Value) -> Result<()>;
}
