//! Model state saving

use super::model::ModelState;
use crate::{Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save a model state as JSON (or YAML for `.yaml`/`.yml` paths)
///
/// # Example
///
/// ```no_run
/// use ajustar::io::{save_model_state, ModelMetadata, ModelState};
///
/// let state = ModelState::from_named(ModelMetadata::new("base", "sequence_classifier"), vec![]);
/// save_model_state(&state, "base.json").unwrap();
/// ```
pub fn save_model_state(state: &ModelState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let data = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::to_string(state)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
        _ => serde_json::to_string(state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
    };

    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;

    Ok(())
}
