//! Example records, batches and data sources

mod example;
mod loader;

pub use example::{read_jsonl, Example, Label};
pub use loader::{Batch, DataLoader, DataSource};
