//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{RunSpec, TrackingBackend};

/// Validate a run specification
///
/// Checks numeric ranges, LoRA settings and option combinations. File
/// existence is left to the command that opens each file.
pub fn validate_config(spec: &RunSpec) -> Result<(), ValidationError> {
    if spec.task.name.trim().is_empty() {
        return Err(ValidationError::EmptyTaskName);
    }
    if spec.task.hidden_size == 0 {
        return Err(ValidationError::InvalidModelSize { hidden_size: spec.task.hidden_size });
    }

    let train = &spec.train;

    if train.learning_rate <= 0.0 || train.learning_rate > 1.0 {
        return Err(ValidationError::InvalidLearningRate(train.learning_rate));
    }
    if train.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(train.epochs));
    }
    if train.weight_decay < 0.0 {
        return Err(ValidationError::InvalidWeightDecay(train.weight_decay));
    }

    for (name, value) in [
        ("train_batch", train.train_batch),
        ("val_batch", train.val_batch),
        ("test_batch", train.test_batch),
    ] {
        if value == 0 {
            return Err(ValidationError::InvalidBatchSize { name, value });
        }
    }

    if !(0.0..=1.0).contains(&train.warmup_ratio) {
        return Err(ValidationError::InvalidWarmupRatio(train.warmup_ratio));
    }
    if train.warmup_init_lr < 0.0 || train.warmup_init_lr > train.learning_rate {
        return Err(ValidationError::InvalidWarmupInitLr(train.warmup_init_lr));
    }
    if train.grad_accum == 0 {
        return Err(ValidationError::InvalidGradAccum(train.grad_accum));
    }
    if train.max_seq_len == 0 {
        return Err(ValidationError::InvalidSeqLen(train.max_seq_len));
    }
    if train.checkpoint_steps == 0 {
        return Err(ValidationError::InvalidCheckpointSteps(train.checkpoint_steps));
    }
    if let Some(clip) = train.max_grad_norm {
        if clip <= 0.0 {
            return Err(ValidationError::InvalidGradClip(clip));
        }
    }
    if train.resume_from_checkpoint && train.checkpoint_path.is_none() {
        return Err(ValidationError::ResumeWithoutCheckpointPath);
    }

    if let Some(lora) = &spec.task.lora {
        if lora.rank > 1024 {
            return Err(ValidationError::InvalidLoRARank(lora.rank));
        }
        if lora.alpha <= 0.0 {
            return Err(ValidationError::InvalidLoRAAlpha(lora.alpha));
        }
        if !(0.0..1.0).contains(&lora.dropout) {
            return Err(ValidationError::InvalidLoRADropout(lora.dropout));
        }
        if lora.heads == 0 {
            return Err(ValidationError::InvalidLoRAHeads(lora.heads));
        }
        if lora.rank > 0 && lora.target_modules.is_empty() {
            return Err(ValidationError::EmptyLoRATargets);
        }
    }

    if spec.tracking.backend == TrackingBackend::Jsonl && spec.tracking.path.is_none() {
        return Err(ValidationError::MissingTrackingPath);
    }

    Ok(())
}
