//! LoRA (Low-Rank Adaptation) layer implementation
//!
//! LoRA enables parameter-efficient fine-tuning by adding trainable low-rank
//! decomposition matrices to frozen pretrained weights.
//!
//! For a frozen weight matrix W ∈ ℝ^(d_out × d_in), LoRA adds:
//! ΔW = B @ A where A ∈ ℝ^(r × d_in) and B ∈ ℝ^(d_out × r)
//!
//! Forward pass: y = x@Wᵀ + s·(dropout(x)@Aᵀ@Bᵀ), s = alpha/r
//!
//! Entering eval mode merges ΔW into W once; entering train mode subtracts
//! it again. Both transitions are guarded so repeated calls are no-ops.

mod core;

#[cfg(test)]
mod tests;

pub use self::core::{LoRALinear, MergeState};
