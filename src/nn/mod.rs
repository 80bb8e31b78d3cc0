//! Neural network building blocks
//!
//! Hand-derived forward/backward over `ndarray` matrices: named parameters,
//! linear layers that can be wrapped by LoRA adapters, and a reference
//! sequence classifier behind the [`Model`] capability.

mod classifier;
mod linear;
mod model;
mod param;
mod registry;

pub use classifier::{Activation, SequenceClassifier};
pub use linear::{Linear, LinearModule};
pub use model::{Model, Outputs};
pub use param::Param;
pub use registry::{ModelBuilder, ModelRegistry, ModelSpec};
