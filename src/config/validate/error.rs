//! Validation error types

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Task name cannot be empty")]
    EmptyTaskName,

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid {name} size: {value} (must be > 0)")]
    InvalidBatchSize { name: &'static str, value: usize },

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid warmup ratio: {0} (must be in [0.0, 1.0])")]
    InvalidWarmupRatio(f32),

    #[error("Invalid warmup init lr: {0} (must be >= 0.0 and <= learning rate)")]
    InvalidWarmupInitLr(f32),

    #[error("Invalid gradient accumulation: {0} (must be > 0)")]
    InvalidGradAccum(usize),

    #[error("Invalid sequence length: {0} (must be > 0)")]
    InvalidSeqLen(usize),

    #[error("Invalid checkpoint steps: {0} (must be > 0)")]
    InvalidCheckpointSteps(usize),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid model size: hidden_size={hidden_size} (must be > 0)")]
    InvalidModelSize { hidden_size: usize },

    #[error("Invalid LoRA rank: {0} (must be <= 1024)")]
    InvalidLoRARank(usize),

    #[error("Invalid LoRA alpha: {0} (must be > 0.0)")]
    InvalidLoRAAlpha(f32),

    #[error("Invalid LoRA dropout: {0} (must be in [0.0, 1.0))")]
    InvalidLoRADropout(f32),

    #[error("Invalid LoRA heads: {0} (must be > 0)")]
    InvalidLoRAHeads(usize),

    #[error("LoRA target modules cannot be empty")]
    EmptyLoRATargets,

    #[error("resume_from_checkpoint requires checkpoint_path")]
    ResumeWithoutCheckpointPath,

    #[error("Tracking backend `jsonl` requires tracking.path")]
    MissingTrackingPath,
}
