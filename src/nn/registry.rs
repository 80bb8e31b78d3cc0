//! Explicit registry of model architectures

use super::{Model, SequenceClassifier};
use crate::io::ModelState;
use crate::lora::{inject_adapters, mark_only_lora_as_trainable, LoRAConfig};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Everything a builder needs to construct a model
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub input_dim: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub num_outputs: usize,
    pub seed: u64,
    pub lora: Option<LoRAConfig>,
    pub pretrained: Option<ModelState>,
}

pub type ModelBuilder = fn(&ModelSpec) -> Result<Box<dyn Model>>;

/// Name → builder lookup, constructed once and passed by reference
pub struct ModelRegistry {
    builders: BTreeMap<String, ModelBuilder>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { builders: BTreeMap::new() }
    }

    /// Registry with the built-in architectures
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("sequence_classifier", build_sequence_classifier);
        registry.register("linear_probe", build_linear_probe);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, builder: ModelBuilder) {
        self.builders.insert(name.into(), builder);
    }

    pub fn names(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }

    pub fn build(&self, name: &str, spec: &ModelSpec) -> Result<Box<dyn Model>> {
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| Error::UnknownModel(format!("{name} (known: {})", self.names().join(", "))))?;
        builder(spec)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Load pretrained weights, then inject adapters and freeze the base
fn finish(mut model: SequenceClassifier, spec: &ModelSpec) -> Result<Box<dyn Model>> {
    if let Some(state) = &spec.pretrained {
        model.load_pretrained(state)?;
    }
    if let Some(lora) = &spec.lora {
        let injected = inject_adapters(&mut model, lora, spec.seed.wrapping_add(1));
        let trainable = mark_only_lora_as_trainable(&mut model, &lora.modules_to_save);
        log::info!(
            "LoRA r={} on {} layers, {trainable} trainable of {} parameters",
            lora.rank,
            injected.len(),
            model.parameters().iter().map(|p| p.len()).sum::<usize>()
        );
    }
    Ok(Box::new(model))
}

fn build_sequence_classifier(spec: &ModelSpec) -> Result<Box<dyn Model>> {
    let model = SequenceClassifier::new(
        spec.input_dim,
        spec.hidden_size,
        spec.num_layers,
        spec.num_outputs,
        spec.seed,
    );
    finish(model, spec)
}

fn build_linear_probe(spec: &ModelSpec) -> Result<Box<dyn Model>> {
    finish(SequenceClassifier::linear_probe(spec.input_dim, spec.num_outputs, spec.seed), spec)
}
