//! Gradient clipping utilities

use crate::nn::Param;

/// Clip gradients by global norm
///
/// Computes the global norm of all trainable gradients and scales them down
/// if the norm exceeds `max_norm`, preserving relative magnitudes.
///
/// Returns the global norm before clipping.
pub fn clip_grad_norm(params: &mut [&mut Param], max_norm: f32) -> f32 {
    let total_norm_sq: f32 = params
        .iter()
        .filter(|p| p.requires_grad())
        .map(|p| p.grad().iter().map(|&g| g * g).sum::<f32>())
        .sum();

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter_mut().filter(|p| p.requires_grad()) {
            param.grad_mut().mapv_inplace(|g| g * clip_coef);
        }
    }

    global_norm
}
