//! Model state loading

use super::model::ModelState;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Load a model state saved by [`super::save_model_state`]
///
/// The format is detected from the file extension; anything other than
/// `.yaml`/`.yml` is read as JSON.
pub fn load_model_state(path: impl AsRef<Path>) -> Result<ModelState> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}"))),
        _ => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}"))),
    }
}
