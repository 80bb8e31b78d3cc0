//! Benchmark tasks
//!
//! A task is data: a [`TaskDescriptor`] names the input fields, the label
//! kind and the metric. [`GenericTask`] turns any descriptor into the loss,
//! decoding and evaluation the run controller needs.

mod descriptor;
mod generic;
mod metric;
mod registry;
mod traits;

pub use descriptor::{LabelKind, TaskDescriptor};
pub use generic::GenericTask;
pub use metric::{
    accuracy, exact_match, f1_binary, matthews_corrcoef, pearson, span_f1, spearman, MetricKind,
    MetricReport,
};
pub use registry::TaskRegistry;
pub use traits::{Loss, Task};
