//! AdamW optimizer (Adam with decoupled Weight decay)

use super::Optimizer;
use crate::nn::Param;
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// AdamW optimizer
///
/// AdamW decouples weight decay from the gradient-based update. Instead of
/// adding weight decay to the gradient, it applies weight decay directly to
/// the parameters.
///
/// AdamW: θ_t = (1 - lr * λ) * θ_{t-1} - lr_t * m_t / (√v_t + ε)
///
/// Moment buffers are keyed by parameter name so that a restored state lines
/// up with the model regardless of parameter ordering.
pub struct AdamW {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: BTreeMap<String, Array2<f32>>,
    v: BTreeMap<String, Array2<f32>>,
}

/// Serialized form of [`AdamW`] carried inside checkpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdamWState {
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub weight_decay: f32,
    pub t: u64,
    pub m: BTreeMap<String, Array2<f32>>,
    pub v: BTreeMap<String, Array2<f32>>,
}

impl AdamW {
    /// Create a new AdamW optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            t: 0,
            m: BTreeMap::new(),
            v: BTreeMap::new(),
        }
    }

    /// Create AdamW with default betas and the given weight decay
    pub fn with_weight_decay(lr: f32, weight_decay: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8, weight_decay)
    }

    /// Create AdamW with default parameters (weight_decay = 0.01)
    pub fn default_params(lr: f32) -> Self {
        Self::with_weight_decay(lr, 0.01)
    }

    /// Get optimizer step counter.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// First moment buffer for a named parameter
    pub fn first_moment(&self, name: &str) -> Option<&Array2<f32>> {
        self.m.get(name)
    }

    /// Second moment buffer for a named parameter
    pub fn second_moment(&self, name: &str) -> Option<&Array2<f32>> {
        self.v.get(name)
    }

    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }
}

impl Optimizer for AdamW {
    fn step(&mut self, params: &mut [&mut Param]) {
        self.t += 1;

        // Bias correction factors
        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for param in params.iter_mut().filter(|p| p.requires_grad()) {
            let grad = param.grad().clone();

            // m_t = β1 * m_{t-1} + (1 - β1) * g
            let m_t = match self.m.get(param.name()) {
                Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                None => &grad * (1.0 - self.beta1),
            };

            // v_t = β2 * v_{t-1} + (1 - β2) * g²
            let grad_sq = &grad * &grad;
            let v_t = match self.v.get(param.name()) {
                Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                None => &grad_sq * (1.0 - self.beta2),
            };

            let adaptive_update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;

            // Apply weight decay directly to parameters (decoupled)
            let weight_decay_factor = 1.0 - self.lr * self.weight_decay;
            let updated = param.value() * weight_decay_factor - &adaptive_update;
            *param.value_mut() = updated;

            let name = param.name().to_string();
            self.m.insert(name.clone(), m_t);
            self.v.insert(name, v_t);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn state(&self) -> serde_json::Value {
        let state = AdamWState {
            lr: self.lr,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            weight_decay: self.weight_decay,
            t: self.t,
            m: self.m.clone(),
            v: self.v.clone(),
        };
        serde_json::to_value(state).unwrap_or(serde_json::Value::Null)
    }

    fn load_state(&mut self, state: &serde_json::Value) -> Result<()> {
        let state: AdamWState = serde_json::from_value(state.clone())
            .map_err(|e| Error::Serialization(format!("AdamW state: {e}")))?;
        self.lr = state.lr;
        self.beta1 = state.beta1;
        self.beta2 = state.beta2;
        self.epsilon = state.epsilon;
        self.weight_decay = state.weight_decay;
        self.t = state.t;
        self.m = state.m;
        self.v = state.v;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn quadratic_grad(p: &mut Param) {
        // f(x) = x², ∇f = 2x
        p.zero_grad();
        let g = p.value() * 2.0;
        p.accumulate_grad(&g);
    }

    #[test]
    fn test_adamw_quadratic_convergence() {
        let mut opt = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.0);
        let mut p = Param::new("x", array![[5.0, -3.0, 2.0]], true);

        for _ in 0..200 {
            quadratic_grad(&mut p);
            opt.step(&mut [&mut p]);
        }

        for &x in p.value() {
            assert!(x.abs() < 0.5, "did not converge: {x}");
        }
    }

    #[test]
    fn test_adamw_weight_decay() {
        let mut opt = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.1);
        let mut p = Param::new("x", array![[1.0]], true);

        // Zero gradient: only decay acts
        opt.step(&mut [&mut p]);
        assert_abs_diff_eq!(p.value()[[0, 0]], 0.99, epsilon = 1e-6);
    }

    #[test]
    fn test_adamw_skips_frozen() {
        let mut opt = AdamW::default_params(0.1);
        let mut frozen = Param::new("frozen", array![[1.0, 2.0]], false);
        let mut trainable = Param::new("trainable", array![[1.0, 2.0]], true);
        trainable.accumulate_grad(&array![[1.0, 1.0]]);

        opt.step(&mut [&mut frozen, &mut trainable]);

        assert_eq!(frozen.value(), &array![[1.0, 2.0]]);
        assert!(opt.first_moment("frozen").is_none());
        assert!(opt.first_moment("trainable").is_some());
    }

    #[test]
    fn test_adamw_lr_getter_setter() {
        let mut opt = AdamW::default_params(0.001);
        assert_eq!(opt.lr(), 0.001);
        opt.set_lr(0.01);
        assert_eq!(opt.lr(), 0.01);
    }

    #[test]
    fn test_adamw_state_roundtrip_reproduces_updates() {
        let mut a = AdamW::with_weight_decay(0.05, 0.01);
        let mut pa = Param::new("x", array![[1.0, -2.0]], true);
        for _ in 0..3 {
            quadratic_grad(&mut pa);
            a.step(&mut [&mut pa]);
        }

        let mut b = AdamW::default_params(1.0);
        b.load_state(&a.state()).expect("load should succeed");
        assert_eq!(b.step_count(), 3);
        let mut pb = pa.clone();

        quadratic_grad(&mut pa);
        quadratic_grad(&mut pb);
        a.step(&mut [&mut pa]);
        b.step(&mut [&mut pb]);

        for (x, y) in pa.value().iter().zip(pb.value().iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_adamw_load_state_rejects_garbage() {
        let mut opt = AdamW::default_params(0.1);
        let result = opt.load_state(&serde_json::json!({ "lr": "fast" }));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
