//! Declarative run configuration
//!
//! A YAML [`RunSpec`] describes the task, data, training hyperparameters,
//! evaluation and tracking of one run. It is parsed with `serde_yaml`,
//! validated by [`validate_config`] and then turned into collaborators by
//! the CLI commands.

mod cli;
mod loader;
pub mod schema;
pub mod validate;

pub use cli::{apply_overrides, parse_args, Cli, Command, RunArgs};
pub use loader::{load_config, parse_config};
pub use schema::{
    DataSpec, EvalSpec, RunSpec, Split, TaskSpec, TrackingBackend, TrackingSpec, TrainParams,
};
pub use validate::{validate_config, ValidationError};
