//! Feed-forward sequence classifier with RoBERTa-style layer names

use super::{Linear, LinearModule, Model, Outputs, Param};
use crate::data::Batch;
use crate::io::{ModelMetadata, ModelState};
use crate::lora::AdapterHost;
use crate::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Tanh,
    Identity,
}

#[derive(Debug, Clone)]
struct Layer {
    path: String,
    module: LinearModule,
    activation: Activation,
}

/// Stack of dense layers over pre-embedded features
///
/// Layout for `num_layers = 2`:
///
/// ```text
/// encoder.layer.0.dense   in     -> hidden  tanh
/// encoder.layer.1.dense   hidden -> hidden  tanh
/// classifier.dense        hidden -> hidden  tanh
/// classifier.out_proj     hidden -> outputs
/// ```
pub struct SequenceClassifier {
    name: String,
    layers: Vec<Layer>,
    outputs: Vec<Array2<f32>>,
    training: bool,
}

impl SequenceClassifier {
    /// Build the encoder + classification head layout
    pub fn new(
        input_dim: usize,
        hidden_size: usize,
        num_layers: usize,
        num_outputs: usize,
        seed: u64,
    ) -> Self {
        let mut layout = Vec::new();
        let mut width = input_dim;
        for i in 0..num_layers {
            layout.push((format!("encoder.layer.{i}.dense"), width, hidden_size, Activation::Tanh));
            width = hidden_size;
        }
        layout.push(("classifier.dense".to_string(), width, hidden_size, Activation::Tanh));
        layout.push(("classifier.out_proj".to_string(), hidden_size, num_outputs, Activation::Identity));
        Self::from_layout("sequence_classifier", layout, seed)
    }

    /// Single linear head directly on the features
    pub fn linear_probe(input_dim: usize, num_outputs: usize, seed: u64) -> Self {
        let layout = vec![(
            "classifier.out_proj".to_string(),
            input_dim,
            num_outputs,
            Activation::Identity,
        )];
        Self::from_layout("linear_probe", layout, seed)
    }

    /// Build from explicit `(path, in, out, activation)` rows
    pub fn from_layout(
        name: &str,
        layout: Vec<(String, usize, usize, Activation)>,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = layout
            .into_iter()
            .map(|(path, d_in, d_out, activation)| Layer {
                module: LinearModule::Plain(Linear::init(&path, d_in, d_out, &mut rng)),
                path,
                activation,
            })
            .collect();
        Self { name: name.to_string(), layers, outputs: Vec::new(), training: true }
    }

    /// Dotted paths of every linear layer, in forward order
    pub fn layer_paths(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.path.as_str()).collect()
    }

    /// Linear slot by path
    pub fn module(&self, path: &str) -> Option<&LinearModule> {
        self.layers.iter().find(|l| l.path == path).map(|l| &l.module)
    }

    /// Copy weights from a base model state, leaving unknown parameters at init
    pub fn load_pretrained(&mut self, state: &ModelState) -> Result<usize> {
        let mut params = self.parameters_mut();
        let loaded = state.apply_to(&mut params, false)?;
        log::info!("loaded {loaded} pretrained parameters from {}", state.metadata.name);
        Ok(loaded)
    }
}

impl Model for SequenceClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, batch: &Batch) -> Result<Outputs> {
        self.outputs.clear();
        let mut x = batch.features.clone();
        for layer in &mut self.layers {
            let z = layer.module.forward(&x)?;
            x = match layer.activation {
                Activation::Tanh => z.mapv(f32::tanh),
                Activation::Identity => z,
            };
            self.outputs.push(x.clone());
        }
        Ok(Outputs { logits: x })
    }

    fn backward(&mut self, grad_logits: &Array2<f32>) -> Result<()> {
        if self.outputs.len() != self.layers.len() {
            return Err(Error::InvalidState("backward called before forward".into()));
        }
        let mut grad = grad_logits.clone();
        for (layer, out) in self.layers.iter_mut().zip(&self.outputs).rev() {
            if layer.activation == Activation::Tanh {
                grad = grad * out.mapv(|a| 1.0 - a * a);
            }
            grad = layer.module.backward(&grad)?;
        }
        Ok(())
    }

    fn train_mode(&mut self, training: bool) {
        self.training = training;
        for layer in &mut self.layers {
            layer.module.set_training(training);
        }
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn parameters(&self) -> Vec<&Param> {
        self.layers.iter().flat_map(|l| l.module.params()).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Param> {
        self.layers.iter_mut().flat_map(|l| l.module.params_mut()).collect()
    }

    fn state(&self) -> ModelState {
        let metadata = ModelMetadata::new(self.name.clone(), "sequence_classifier")
            .with_custom("layers", serde_json::json!(self.layer_paths()));
        ModelState::from_named(metadata, self.layers.iter().flat_map(|l| l.module.canonical_params()))
    }

    fn load_state(&mut self, state: &ModelState) -> Result<()> {
        let was_training = self.training;
        self.train_mode(true);
        let result = {
            let mut params = self.parameters_mut();
            state.apply_to(&mut params, true)
        };
        self.train_mode(was_training);
        result.map(|_| ())
    }
}

impl AdapterHost for SequenceClassifier {
    fn linear_modules_mut(&mut self) -> Vec<(String, &mut LinearModule)> {
        self.layers.iter_mut().map(|l| (l.path.clone(), &mut l.module)).collect()
    }

    fn host_params_mut(&mut self) -> Vec<&mut Param> {
        self.parameters_mut()
    }
}
