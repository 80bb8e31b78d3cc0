//! Model structure for serialization

use crate::nn::Param;
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
pub(crate) fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Model metadata containing architecture and training information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model architecture type (e.g., "sequence_classifier")
    pub architecture: String,

    /// Model version
    pub version: String,

    /// Custom metadata fields
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: "0.1.0".to_string(),
            custom: HashMap::new(),
        }
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// Information about a model parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g., "encoder.layer.0.dense.weight")
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,

    /// Data type (always "f32" for now)
    pub dtype: String,

    /// Whether this parameter requires gradients
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub requires_grad: bool,
}

/// Serializable model state
///
/// Parameters are stored back to back in `data` in the order of `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Parameter information
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

impl ModelState {
    /// Build a state from `(name, value, requires_grad)` triples
    pub fn from_named(
        metadata: ModelMetadata,
        named: impl IntoIterator<Item = (String, Array2<f32>, bool)>,
    ) -> Self {
        let mut data = Vec::new();
        let parameters = named
            .into_iter()
            .map(|(name, value, requires_grad)| {
                let (rows, cols) = value.dim();
                data.extend(value.iter().copied());
                ParameterInfo { name, shape: vec![rows, cols], dtype: "f32".to_string(), requires_grad }
            })
            .collect();
        Self { metadata, parameters, data }
    }

    /// Build a state from live parameters
    pub fn from_params<'a>(metadata: ModelMetadata, params: impl IntoIterator<Item = &'a Param>) -> Self {
        Self::from_named(
            metadata,
            params
                .into_iter()
                .map(|p| (p.name().to_string(), p.value().clone(), p.requires_grad())),
        )
    }

    /// Look up a parameter by name as a matrix
    pub fn get(&self, name: &str) -> Option<Array2<f32>> {
        let mut offset = 0;
        for info in &self.parameters {
            let size: usize = info.shape.iter().product();
            if info.name == name {
                let (rows, cols) = matrix_dims(&info.shape);
                let slice = self.data.get(offset..offset + size)?;
                return Array2::from_shape_vec((rows, cols), slice.to_vec()).ok();
            }
            offset += size;
        }
        None
    }

    /// Number of scalars described by `parameters`
    pub fn num_elements(&self) -> usize {
        self.parameters.iter().map(|p| p.shape.iter().product::<usize>()).sum()
    }

    /// Copy stored values into matching live parameters
    ///
    /// In strict mode every live parameter must be present with the same
    /// shape. Otherwise parameters missing from the state keep their current
    /// values (loading a base model into an adapted one). Trainability is
    /// never taken from the state.
    pub fn apply_to(&self, params: &mut [&mut Param], strict: bool) -> Result<usize> {
        if self.num_elements() != self.data.len() {
            return Err(Error::Serialization(format!(
                "model state declares {} values but holds {}",
                self.num_elements(),
                self.data.len()
            )));
        }

        let mut loaded = 0;
        for param in params.iter_mut() {
            match self.get(param.name()) {
                Some(value) => {
                    if value.dim() != param.value().dim() {
                        let (r, c) = param.value().dim();
                        return Err(Error::ShapeMismatch {
                            expected: vec![r, c],
                            actual: vec![value.nrows(), value.ncols()],
                        });
                    }
                    *param.value_mut() = value;
                    loaded += 1;
                }
                None if strict => {
                    return Err(Error::Serialization(format!(
                        "model state has no parameter named {}",
                        param.name()
                    )));
                }
                None => log::debug!("parameter {} not in state, keeping init", param.name()),
            }
        }
        Ok(loaded)
    }
}

fn matrix_dims(shape: &[usize]) -> (usize, usize) {
    match shape {
        [] => (1, 1),
        [n] => (1, *n),
        [r, rest @ ..] => (*r, rest.iter().product()),
    }
}
