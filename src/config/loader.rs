//! Loading a run specification from YAML

use super::schema::RunSpec;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Parse a run specification from YAML text without validating it
pub fn parse_config(yaml: &str) -> Result<RunSpec> {
    serde_yaml::from_str(yaml).map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))
}

/// Load and validate a run specification
///
/// # Example
///
/// ```no_run
/// use ajustar::config::load_config;
///
/// let spec = load_config("run.yaml")?;
/// assert!(spec.train.epochs > 0);
/// # Ok::<(), ajustar::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<RunSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    let spec = parse_config(&yaml_content)?;
    validate_config(&spec)?;
    Ok(spec)
}
