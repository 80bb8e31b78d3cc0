//! Explicit registry of task descriptors

use super::{LabelKind, MetricKind, TaskDescriptor};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Name → descriptor lookup, constructed once and passed by reference
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, TaskDescriptor>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// GLUE tasks plus SQuAD v2 span extraction
    pub fn with_defaults() -> Self {
        use MetricKind::*;

        let mut registry = Self::new();
        registry.register(TaskDescriptor::classification("cola", &["sentence"], 2, Matthews));
        registry.register(TaskDescriptor::classification("sst2", &["sentence"], 2, Accuracy));
        registry.register(TaskDescriptor::classification("mrpc", &["sentence1", "sentence2"], 2, AccuracyF1));
        registry.register(TaskDescriptor::classification("qqp", &["question1", "question2"], 2, AccuracyF1));
        registry.register(TaskDescriptor {
            label_kind: LabelKind::Regression,
            ..TaskDescriptor::classification("stsb", &["sentence1", "sentence2"], 1, PearsonSpearman)
        });
        registry.register(
            TaskDescriptor::classification("mnli", &["premise", "hypothesis"], 3, Accuracy)
                .with_label_names(&["entailment", "neutral", "contradiction"]),
        );
        registry.register(
            TaskDescriptor::classification("qnli", &["question", "sentence"], 2, Accuracy)
                .with_label_names(&["entailment", "not_entailment"]),
        );
        registry.register(
            TaskDescriptor::classification("rte", &["sentence1", "sentence2"], 2, Accuracy)
                .with_label_names(&["entailment", "not_entailment"]),
        );
        registry.register(TaskDescriptor::classification("wnli", &["sentence1", "sentence2"], 2, Accuracy));
        registry.register(TaskDescriptor {
            label_kind: LabelKind::Span,
            ..TaskDescriptor::classification("squad_v2", &["context", "question"], 0, Span)
        });
        registry
    }

    /// Add or replace a descriptor under its own name
    pub fn register(&mut self, descriptor: TaskDescriptor) {
        self.tasks.insert(descriptor.name.clone(), descriptor);
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Result<&TaskDescriptor> {
        self.tasks
            .get(name)
            .ok_or_else(|| Error::UnknownTask(format!("{name} (known: {})", self.names().join(", "))))
    }
}
