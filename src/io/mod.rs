//! Model state and prediction file I/O

mod load;
mod model;
mod predictions;
mod save;

pub use load::load_model_state;
pub(crate) use model::deserialize_bool_lenient;
pub use model::{ModelMetadata, ModelState, ParameterInfo};
pub use predictions::{
    read_predictions, testset_predictions_path, write_predictions, write_submission_tsv,
};
pub use save::save_model_state;
