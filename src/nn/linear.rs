//! Dense affine layer and the adaptable linear slot used by models

use super::Param;
use crate::lora::{LoRAConfig, LoRALinear};
use crate::{Error, Result};
use ndarray::{Array2, Axis};
use rand::Rng;

/// Affine layer `y = x @ Wᵀ + b`
///
/// Weight is `[out_features, in_features]`, bias is `[1, out_features]`.
/// The most recent input is cached for the backward pass.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Param,
    bias: Option<Param>,
    input: Option<Array2<f32>>,
}

impl Default for Linear {
    fn default() -> Self {
        Self::new("", Array2::zeros((0, 0)), None)
    }
}

impl Linear {
    /// Wrap explicit weights; parameters are named `{path}.weight` / `{path}.bias`
    pub fn new(path: &str, weight: Array2<f32>, bias: Option<Array2<f32>>) -> Self {
        Self {
            weight: Param::new(format!("{path}.weight"), weight, true),
            bias: bias.map(|b| Param::new(format!("{path}.bias"), b, true)),
            input: None,
        }
    }

    /// Uniform init in `±1/sqrt(in_features)` for both weight and bias
    pub fn init<R: Rng + ?Sized>(
        path: &str,
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Self {
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        let weight = Array2::from_shape_fn((out_features, in_features), |_| {
            rng.random_range(-bound..=bound)
        });
        let bias = Array2::from_shape_fn((1, out_features), |_| rng.random_range(-bound..=bound));
        Self::new(path, weight, Some(bias))
    }

    pub fn in_features(&self) -> usize {
        self.weight.value().ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.value().nrows()
    }

    pub fn weight(&self) -> &Param {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut Param {
        &mut self.weight
    }

    pub fn bias(&self) -> Option<&Param> {
        self.bias.as_ref()
    }

    /// Forward pass without touching the cache
    pub fn apply(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.in_features() {
            return Err(Error::ShapeMismatch {
                expected: vec![x.nrows(), self.in_features()],
                actual: vec![x.nrows(), x.ncols()],
            });
        }
        let mut y = x.dot(&self.weight.value().t());
        if let Some(bias) = &self.bias {
            y += bias.value();
        }
        Ok(y)
    }

    /// Forward pass caching the input for [`Linear::backward`]
    pub fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let y = self.apply(x)?;
        self.input = Some(x.clone());
        Ok(y)
    }

    /// Accumulate weight/bias gradients and return the input gradient
    pub fn backward(&mut self, grad_out: &Array2<f32>) -> Result<Array2<f32>> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::InvalidState("backward called before forward".into()))?;

        let grad_w = grad_out.t().dot(input);
        self.weight.accumulate_grad(&grad_w);
        if let Some(bias) = &mut self.bias {
            let grad_b = grad_out.sum_axis(Axis(0)).insert_axis(Axis(0));
            bias.accumulate_grad(&grad_b);
        }
        Ok(grad_out.dot(self.weight.value()))
    }

    pub fn params(&self) -> Vec<&Param> {
        std::iter::once(&self.weight).chain(self.bias.as_ref()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        std::iter::once(&mut self.weight).chain(self.bias.as_mut()).collect()
    }
}

/// A linear slot in a model that may be wrapped by a LoRA adapter
#[derive(Debug, Clone)]
pub enum LinearModule {
    Plain(Linear),
    Adapted(Box<LoRALinear>),
}

impl LinearModule {
    pub fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        match self {
            LinearModule::Plain(l) => l.forward(x),
            LinearModule::Adapted(l) => l.forward(x),
        }
    }

    pub fn backward(&mut self, grad_out: &Array2<f32>) -> Result<Array2<f32>> {
        match self {
            LinearModule::Plain(l) => l.backward(grad_out),
            LinearModule::Adapted(l) => l.backward(grad_out),
        }
    }

    /// Propagate train/eval mode; adapters merge on eval and unmerge on train
    pub fn set_training(&mut self, training: bool) {
        if let LinearModule::Adapted(l) = self {
            l.train(training);
        }
    }

    pub fn is_adapted(&self) -> bool {
        matches!(self, LinearModule::Adapted(_))
    }

    /// Replace a plain layer by an adapter wrapping it as frozen base
    ///
    /// Returns `false` if the slot is already adapted.
    pub fn adapt(&mut self, path: &str, config: &LoRAConfig, seed: u64) -> bool {
        let LinearModule::Plain(base) = self else {
            return false;
        };
        let base = std::mem::take(base);
        *self = LinearModule::Adapted(Box::new(LoRALinear::new(path, base, config, seed)));
        true
    }

    pub fn params(&self) -> Vec<&Param> {
        match self {
            LinearModule::Plain(l) => l.params(),
            LinearModule::Adapted(l) => l.params(),
        }
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        match self {
            LinearModule::Plain(l) => l.params_mut(),
            LinearModule::Adapted(l) => l.params_mut(),
        }
    }

    /// Parameters as they would be with every adapter unmerged
    pub fn canonical_params(&self) -> Vec<(String, Array2<f32>, bool)> {
        match self {
            LinearModule::Plain(l) => l
                .params()
                .into_iter()
                .map(|p| (p.name().to_string(), p.value().clone(), p.requires_grad()))
                .collect(),
            LinearModule::Adapted(l) => l.canonical_params(),
        }
    }
}
