//! YAML schema for a fine-tuning run

use crate::io::deserialize_bool_lenient;
use crate::lora::LoRAConfig;
use crate::optim::{SchedulerKind, DEFAULT_WARMUP_INIT_LR};
use crate::train::ResumeGranularity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete run specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub task: TaskSpec,

    #[serde(default)]
    pub data: DataSpec,

    #[serde(default)]
    pub train: TrainParams,

    #[serde(default)]
    pub eval: EvalSpec,

    #[serde(default)]
    pub tracking: TrackingSpec,
}

/// Task and model selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Key into the task registry (e.g. `mrpc`)
    pub name: String,

    /// Key into the model registry
    #[serde(default = "default_model")]
    pub model: String,

    /// Pretrained base weights (a saved model state)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,

    #[serde(default = "default_num_layers")]
    pub num_layers: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lora: Option<LoRAConfig>,
}

/// JSONL split locations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<PathBuf>,
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    #[serde(default = "default_lr")]
    pub learning_rate: f32,

    #[serde(default = "default_epochs")]
    pub epochs: usize,

    #[serde(default = "default_weight_decay")]
    pub weight_decay: f32,

    #[serde(default = "default_train_batch")]
    pub train_batch: usize,

    #[serde(default = "default_eval_batch")]
    pub val_batch: usize,

    #[serde(default = "default_eval_batch")]
    pub test_batch: usize,

    #[serde(default = "default_warmup_ratio")]
    pub warmup_ratio: f32,

    #[serde(default = "default_warmup_init_lr")]
    pub warmup_init_lr: f32,

    /// Batches per optimizer step
    #[serde(default = "default_one")]
    pub grad_accum: usize,

    #[serde(default)]
    pub scheduler: SchedulerKind,

    #[serde(default = "default_max_seq_len")]
    pub max_seq_len: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_path: Option<PathBuf>,

    #[serde(default = "default_checkpoint_steps")]
    pub checkpoint_steps: usize,

    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub resume_from_checkpoint: bool,

    #[serde(default)]
    pub resume_granularity: ResumeGranularity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_grad_norm: Option<f32>,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            learning_rate: default_lr(),
            epochs: default_epochs(),
            weight_decay: default_weight_decay(),
            train_batch: default_train_batch(),
            val_batch: default_eval_batch(),
            test_batch: default_eval_batch(),
            warmup_ratio: default_warmup_ratio(),
            warmup_init_lr: default_warmup_init_lr(),
            grad_accum: 1,
            scheduler: SchedulerKind::default(),
            max_seq_len: default_max_seq_len(),
            checkpoint_path: None,
            checkpoint_steps: default_checkpoint_steps(),
            resume_from_checkpoint: false,
            resume_granularity: ResumeGranularity::default(),
            max_grad_norm: None,
            seed: default_seed(),
            output_dir: default_output_dir(),
        }
    }
}

/// Which labeled split `eval` scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    #[default]
    Validation,
    Test,
}

/// Standalone evaluation / inference settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalSpec {
    /// Explicit checkpoint file; the latest in `checkpoint_path` otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<PathBuf>,

    #[serde(default)]
    pub split: Split,

    /// GLUE submission TSV written by `infer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingBackend {
    #[default]
    None,
    Memory,
    Jsonl,
}

/// Experiment logger selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackingSpec {
    #[serde(default)]
    pub backend: TrackingBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_model() -> String {
    "sequence_classifier".to_string()
}

fn default_hidden_size() -> usize {
    64
}

fn default_num_layers() -> usize {
    2
}

fn default_lr() -> f32 {
    2e-5
}

fn default_epochs() -> usize {
    3
}

fn default_weight_decay() -> f32 {
    0.01
}

fn default_train_batch() -> usize {
    16
}

fn default_eval_batch() -> usize {
    32
}

fn default_warmup_ratio() -> f32 {
    0.06
}

fn default_warmup_init_lr() -> f32 {
    DEFAULT_WARMUP_INIT_LR
}

fn default_one() -> usize {
    1
}

fn default_max_seq_len() -> usize {
    128
}

fn default_checkpoint_steps() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
