//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::nn::Param;
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: BTreeMap<String, Array2<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SgdState {
    lr: f32,
    momentum: f32,
    velocities: BTreeMap<String, Array2<f32>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self { lr, momentum, velocities: BTreeMap::new() }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Param]) {
        for param in params.iter_mut().filter(|p| p.requires_grad()) {
            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match self.velocities.get(param.name()) {
                    Some(v) => v * self.momentum - param.grad() * self.lr,
                    None => param.grad() * (-self.lr),
                };
                *param.value_mut() += &velocity;
                self.velocities.insert(param.name().to_string(), velocity);
            } else {
                let update = param.grad() * self.lr;
                *param.value_mut() -= &update;
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn state(&self) -> serde_json::Value {
        let state = SgdState {
            lr: self.lr,
            momentum: self.momentum,
            velocities: self.velocities.clone(),
        };
        serde_json::to_value(state).unwrap_or(serde_json::Value::Null)
    }

    fn load_state(&mut self, state: &serde_json::Value) -> Result<()> {
        let state: SgdState = serde_json::from_value(state.clone())
            .map_err(|e| Error::Serialization(format!("SGD state: {e}")))?;
        self.lr = state.lr;
        self.momentum = state.momentum;
        self.velocities = state.velocities;
        Ok(())
    }
}
