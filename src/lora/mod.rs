//! LoRA (Low-Rank Adaptation) implementation
//!
//! LoRA enables parameter-efficient fine-tuning of pretrained models
//! by adding trainable low-rank decomposition matrices to frozen weights.

mod config;
mod inject;
mod layer;

pub use config::LoRAConfig;
pub use inject::{
    inject_adapters, is_adapter_param, mark_only_lora_as_trainable, path_matches, AdapterHost,
};
pub use layer::{LoRALinear, MergeState};
