//! LoRA adapter configuration

use serde::{Deserialize, Serialize};

/// Adapter hyperparameters and injection targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoRAConfig {
    /// Rank of the low-rank decomposition; 0 disables the delta path
    #[serde(default = "default_rank")]
    pub rank: usize,

    /// Scaling numerator; effective scale is `alpha / rank`
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Dropout applied to the adapter input during training
    #[serde(default)]
    pub dropout: f32,

    /// Number of independent adapter heads per layer
    #[serde(default = "default_heads")]
    pub heads: usize,

    /// Path segments of the linear layers to wrap (e.g. `[dense, out_proj]`)
    #[serde(default = "default_target_modules")]
    pub target_modules: Vec<String>,

    /// Modules that stay fully trainable besides the adapters (e.g. `[classifier]`)
    #[serde(default)]
    pub modules_to_save: Vec<String>,
}

fn default_rank() -> usize {
    8
}

fn default_alpha() -> f32 {
    8.0
}

fn default_heads() -> usize {
    1
}

fn default_target_modules() -> Vec<String> {
    vec!["dense".to_string()]
}

impl Default for LoRAConfig {
    fn default() -> Self {
        Self {
            rank: default_rank(),
            alpha: default_alpha(),
            dropout: 0.0,
            heads: default_heads(),
            target_modules: default_target_modules(),
            modules_to_save: Vec::new(),
        }
    }
}

impl LoRAConfig {
    /// `alpha / rank`, or 0 when the adapter is disabled
    pub fn scaling(&self) -> f32 {
        if self.rank == 0 {
            0.0
        } else {
            self.alpha / self.rank as f32
        }
    }
}
