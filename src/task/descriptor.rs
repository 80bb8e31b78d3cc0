//! Data-driven task descriptions

use super::MetricKind;
use serde::{Deserialize, Serialize};

/// Shape of a task's gold labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LabelKind {
    /// Single-label classification over `num_labels` classes
    Classification { num_labels: usize },
    /// Single scalar score
    Regression,
    /// Start/end positions within the first input field
    Span,
}

/// Everything the generic task needs to know about one benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: String,
    /// JSONL fields concatenated into the model input, in order
    pub input_fields: Vec<String>,
    pub label_kind: LabelKind,
    pub metric: MetricKind,
    /// Human-readable class names for submission files; empty for
    /// tasks whose official format uses integers
    #[serde(default)]
    pub label_names: Vec<String>,
}

impl TaskDescriptor {
    pub fn classification(
        name: &str,
        input_fields: &[&str],
        num_labels: usize,
        metric: MetricKind,
    ) -> Self {
        Self {
            name: name.to_string(),
            input_fields: input_fields.iter().map(|f| f.to_string()).collect(),
            label_kind: LabelKind::Classification { num_labels },
            metric,
            label_names: Vec::new(),
        }
    }

    pub fn with_label_names(mut self, names: &[&str]) -> Self {
        self.label_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Number of model outputs needed for this task
    ///
    /// Span tasks emit start logits followed by end logits, one per
    /// position of the first input field.
    pub fn output_width(&self, max_seq_len: usize) -> usize {
        match self.label_kind {
            LabelKind::Classification { num_labels } => num_labels,
            LabelKind::Regression => 1,
            LabelKind::Span => 2 * max_seq_len,
        }
    }

    /// Width of the feature vector the data loader builds for this task
    pub fn input_width(&self, max_seq_len: usize) -> usize {
        self.input_fields.len() * max_seq_len
    }
}
