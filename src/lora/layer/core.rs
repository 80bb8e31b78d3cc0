//! LoRA-wrapped linear layer with guarded merge/unmerge

use crate::lora::LoRAConfig;
use crate::nn::{Linear, Param};
use crate::{Error, Result};
use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Whether the scaled delta currently lives inside the base weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// Base weight untouched; delta computed at forward time (training)
    Unmerged,
    /// `base += scaling · B @ A` has been applied (inference)
    Merged,
}

/// LoRA layer: adds a trainable low-rank delta to a frozen base linear layer
///
/// A is stored as `[heads·r, d_in]` and B as `[d_out, heads·r]`; the headed
/// views `[heads, r, d_in]` / `[d_out, heads, r]` are reshapes of the same
/// buffers, so `B @ A` already sums the per-head products.
#[derive(Debug, Clone)]
pub struct LoRALinear {
    base: Linear,
    lora_a: Option<Param>,
    lora_b: Option<Param>,
    rank: usize,
    heads: usize,
    scale: f32,
    dropout: f32,
    state: MergeState,
    training: bool,
    rng: StdRng,
    dropped_input: Option<Array2<f32>>,
    dropout_mask: Option<Array2<f32>>,
    hidden: Option<Array2<f32>>,
}

impl LoRALinear {
    /// Wrap `base` as a frozen layer and allocate adapter parameters
    ///
    /// A is Kaiming-uniform initialized, B is zero, so the wrapped layer
    /// initially computes exactly what `base` did. With `rank == 0` no
    /// adapter parameters are allocated and the layer is a passthrough.
    pub fn new(path: &str, mut base: Linear, config: &LoRAConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        for p in base.params_mut() {
            p.set_requires_grad(false);
        }

        let heads = config.heads.max(1);
        let inner = heads * config.rank;
        let (lora_a, lora_b) = if config.rank == 0 {
            (None, None)
        } else {
            let d_in = base.in_features();
            let fan_in = if heads > 1 { config.rank * d_in } else { d_in };
            // kaiming_uniform(a = √5) reduces to 1/sqrt(fan_in)
            let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
            let a = Array2::from_shape_fn((inner, d_in), |_| rng.random_range(-bound..=bound));
            let b = Array2::zeros((base.out_features(), inner));
            (
                Some(Param::new(format!("{path}.lora_a"), a, true)),
                Some(Param::new(format!("{path}.lora_b"), b, true)),
            )
        };

        Self {
            base,
            lora_a,
            lora_b,
            rank: config.rank,
            heads,
            scale: config.scaling(),
            dropout: config.dropout,
            state: MergeState::Unmerged,
            training: true,
            rng,
            dropped_input: None,
            dropout_mask: None,
            hidden: None,
        }
    }

    fn adapter(&self) -> Option<(&Param, &Param)> {
        self.lora_a.as_ref().zip(self.lora_b.as_ref())
    }

    /// `scaling · B @ A` as a `[d_out, d_in]` matrix
    pub fn delta_weight(&self) -> Option<Array2<f32>> {
        self.adapter().map(|(a, b)| b.value().dot(a.value()) * self.scale)
    }

    /// Forward pass
    ///
    /// Unmerged: `base(x) + scaling · dropout(x) @ Aᵀ @ Bᵀ`. Merged: `base(x)`.
    pub fn forward(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let mut out = self.base.forward(x)?;
        if self.state == MergeState::Merged {
            return Ok(out);
        }
        let Some((a, b)) = self.lora_a.as_ref().zip(self.lora_b.as_ref()) else {
            return Ok(out);
        };

        let (dropped, mask) = if self.training && self.dropout > 0.0 {
            let keep = 1.0 - self.dropout;
            let rng = &mut self.rng;
            let mask = Array2::from_shape_fn(x.raw_dim(), |_| {
                if rng.random::<f32>() < keep {
                    1.0 / keep
                } else {
                    0.0
                }
            });
            (x * &mask, Some(mask))
        } else {
            (x.clone(), None)
        };

        let hidden = dropped.dot(&a.value().t());
        out += &(hidden.dot(&b.value().t()) * self.scale);

        self.dropped_input = Some(dropped);
        self.dropout_mask = mask;
        self.hidden = Some(hidden);
        Ok(out)
    }

    /// Backward pass: gradients flow to A and B; the frozen base receives none
    pub fn backward(&mut self, grad_out: &Array2<f32>) -> Result<Array2<f32>> {
        if self.state == MergeState::Merged {
            return Err(Error::InvalidState(
                "backward through a merged adapter; switch to train mode first".into(),
            ));
        }
        let mut grad_in = self.base.backward(grad_out)?;
        let (Some(a), Some(b)) = (self.lora_a.as_mut(), self.lora_b.as_mut()) else {
            return Ok(grad_in);
        };
        let (Some(dropped), Some(hidden)) = (self.dropped_input.as_ref(), self.hidden.as_ref())
        else {
            return Err(Error::InvalidState("adapter backward called before forward".into()));
        };

        let grad_b = grad_out.t().dot(hidden) * self.scale;
        let grad_hidden = grad_out.dot(b.value()) * self.scale;
        let grad_a = grad_hidden.t().dot(dropped);
        b.accumulate_grad(&grad_b);
        a.accumulate_grad(&grad_a);

        let mut grad_dropped = grad_hidden.dot(a.value());
        if let Some(mask) = &self.dropout_mask {
            grad_dropped *= mask;
        }
        grad_in += &grad_dropped;
        Ok(grad_in)
    }

    /// Fold the delta into the base weight. No-op if already merged.
    pub fn merge(&mut self) {
        if self.state == MergeState::Merged {
            return;
        }
        if let Some(delta) = self.delta_weight() {
            *self.base.weight_mut().value_mut() += &delta;
        }
        self.state = MergeState::Merged;
    }

    /// Remove the delta from the base weight. No-op if not merged.
    pub fn unmerge(&mut self) {
        if self.state == MergeState::Unmerged {
            return;
        }
        if let Some(delta) = self.delta_weight() {
            *self.base.weight_mut().value_mut() -= &delta;
        }
        self.state = MergeState::Unmerged;
    }

    /// Train mode unmerges, eval mode merges
    pub fn train(&mut self, mode: bool) {
        self.training = mode;
        if mode {
            self.unmerge();
        } else {
            self.merge();
        }
    }

    pub fn merge_state(&self) -> MergeState {
        self.state
    }

    pub fn is_merged(&self) -> bool {
        self.state == MergeState::Merged
    }

    pub fn base(&self) -> &Linear {
        &self.base
    }

    pub fn lora_a(&self) -> Option<&Param> {
        self.lora_a.as_ref()
    }

    pub fn lora_a_mut(&mut self) -> Option<&mut Param> {
        self.lora_a.as_mut()
    }

    pub fn lora_b(&self) -> Option<&Param> {
        self.lora_b.as_ref()
    }

    pub fn lora_b_mut(&mut self) -> Option<&mut Param> {
        self.lora_b.as_mut()
    }

    /// A viewed as `[heads, r, d_in]`
    pub fn lora_a_headed(&self) -> Option<Array3<f32>> {
        let a = self.lora_a.as_ref()?;
        let d_in = a.value().ncols();
        Array3::from_shape_vec(
            (self.heads, self.rank, d_in),
            a.value().iter().copied().collect(),
        )
        .ok()
    }

    /// B viewed as `[d_out, heads, r]`
    pub fn lora_b_headed(&self) -> Option<Array3<f32>> {
        let b = self.lora_b.as_ref()?;
        let d_out = b.value().nrows();
        Array3::from_shape_vec(
            (d_out, self.heads, self.rank),
            b.value().iter().copied().collect(),
        )
        .ok()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn heads(&self) -> usize {
        self.heads
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Adapter parameters only
    pub fn trainable_params(&mut self) -> Vec<&mut Param> {
        self.lora_a.iter_mut().chain(self.lora_b.iter_mut()).collect()
    }

    /// Base then adapter parameters
    pub fn params(&self) -> Vec<&Param> {
        let mut params = self.base.params();
        params.extend(self.lora_a.iter().chain(self.lora_b.iter()));
        params
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        let mut params = self.base.params_mut();
        params.extend(self.lora_a.iter_mut().chain(self.lora_b.iter_mut()));
        params
    }

    /// Parameter values with the base weight expressed in unmerged form
    pub fn canonical_params(&self) -> Vec<(String, Array2<f32>, bool)> {
        let unmerged_delta = if self.is_merged() { self.delta_weight() } else { None };
        self.params()
            .into_iter()
            .map(|p| {
                let mut value = p.value().clone();
                if let Some(delta) = &unmerged_delta {
                    if p.name() == self.base.weight().name() {
                        value -= delta;
                    }
                }
                (p.name().to_string(), value, p.requires_grad())
            })
            .collect()
    }
}
