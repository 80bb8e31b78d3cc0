//! Adapter injection into named linear sublayers and trainability marking

use super::LoRAConfig;
use crate::nn::{LinearModule, Param};

/// A model that exposes its linear sublayers by dotted path
pub trait AdapterHost {
    /// Every linear slot with its fully-qualified path, in a stable order
    fn linear_modules_mut(&mut self) -> Vec<(String, &mut LinearModule)>;

    /// All parameters, for trainability marking
    fn host_params_mut(&mut self) -> Vec<&mut Param>;
}

/// Whether `pattern` occurs in `path` as whole dot-separated segments
///
/// `encoder.layer.0.dense` matches `dense` and `layer.0.dense` but not `den`
/// or `dense_proj`.
pub fn path_matches(path: &str, pattern: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    let wanted: Vec<&str> = pattern.split('.').collect();
    if wanted.is_empty() || wanted.len() > segments.len() {
        return false;
    }
    segments.windows(wanted.len()).any(|w| w == wanted.as_slice())
}

/// Whether a parameter belongs to an adapter (`…lora_a` / `…lora_b`)
pub fn is_adapter_param(name: &str) -> bool {
    name.split('.').any(|s| s == "lora_a" || s == "lora_b")
}

/// Wrap every matching linear sublayer with a LoRA adapter
///
/// Layers already adapted are left alone. Each adapter gets its own
/// deterministic seed derived from `seed` and its position. Returns the
/// paths that were wrapped.
pub fn inject_adapters(host: &mut dyn AdapterHost, config: &LoRAConfig, seed: u64) -> Vec<String> {
    let mut injected = Vec::new();
    for (idx, (path, module)) in host.linear_modules_mut().into_iter().enumerate() {
        let targeted = config.target_modules.iter().any(|t| path_matches(&path, t));
        if targeted && module.adapt(&path, config, seed.wrapping_add(idx as u64)) {
            log::debug!("injected LoRA adapter (r={}) into {path}", config.rank);
            injected.push(path);
        }
    }
    injected
}

/// Freeze everything except adapter parameters and `modules_to_save`
///
/// Returns the number of trainable scalars left.
pub fn mark_only_lora_as_trainable(host: &mut dyn AdapterHost, modules_to_save: &[String]) -> usize {
    let mut trainable = 0;
    for param in host.host_params_mut() {
        let keep = is_adapter_param(param.name())
            || modules_to_save.iter().any(|m| path_matches(param.name(), m));
        param.set_requires_grad(keep);
        if keep {
            trainable += param.len();
        }
    }
    trainable
}
