//! One task implementation driven by a [`TaskDescriptor`]

use super::{LabelKind, Loss, MetricReport, Task, TaskDescriptor};
use crate::data::{Batch, Label};
use crate::nn::Outputs;
use crate::{Error, Result};
use ndarray::{Array2, ArrayView1};

/// Task whose loss, decoding and metric all follow from its descriptor
#[derive(Debug, Clone)]
pub struct GenericTask {
    descriptor: TaskDescriptor,
    max_seq_len: usize,
    example_ids: Vec<String>,
}

impl GenericTask {
    pub fn new(descriptor: TaskDescriptor, max_seq_len: usize) -> Self {
        Self { descriptor, max_seq_len, example_ids: Vec::new() }
    }

    /// Declare the test-set ids predictions will be keyed by
    pub fn with_example_ids(mut self, ids: Vec<String>) -> Self {
        self.example_ids = ids;
        self
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    fn check_width(&self, logits: &Array2<f32>) -> Result<()> {
        let expected = self.descriptor.output_width(self.max_seq_len);
        if logits.ncols() != expected {
            return Err(Error::ShapeMismatch {
                expected: vec![logits.nrows(), expected],
                actual: vec![logits.nrows(), logits.ncols()],
            });
        }
        Ok(())
    }
}

/// Numerically stable softmax of one row
fn softmax(row: ArrayView1<f32>) -> Vec<f32> {
    let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

fn argmax(row: ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
        .0
}

/// Cross-entropy of `target` under `row`; writes `scale * (p - onehot)` into `grad`
fn cross_entropy_into(row: ArrayView1<f32>, target: usize, scale: f32, grad: &mut [f32]) -> f32 {
    let probs = softmax(row);
    for (g, &p) in grad.iter_mut().zip(&probs) {
        *g += scale * p;
    }
    grad[target] -= scale;
    -(probs[target] + 1e-10).max(f32::MIN_POSITIVE).ln()
}

impl Task for GenericTask {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn loss(&self, outputs: &Outputs, batch: &Batch) -> Result<Loss> {
        let logits = &outputs.logits;
        self.check_width(logits)?;
        let labels = self.extract_labels(batch)?;
        if labels.len() != logits.nrows() {
            return Err(Error::CountMismatch { expected: logits.nrows(), actual: labels.len() });
        }
        let n = labels.len().max(1) as f32;
        let mut grad = Array2::<f32>::zeros(logits.raw_dim());
        let mut total = 0.0;

        for (i, label) in labels.iter().enumerate() {
            let row = logits.row(i);
            let mut g = vec![0.0; row.len()];
            // integer scores in regression files parse as classes
            let label = match (self.descriptor.label_kind, *label) {
                (LabelKind::Regression, Label::Class(c)) => Label::Score(c as f32),
                (_, l) => l,
            };
            total += match (self.descriptor.label_kind, label) {
                (LabelKind::Classification { num_labels }, Label::Class(c)) => {
                    if c >= num_labels {
                        return Err(Error::Data(format!("label {c} out of range for {num_labels} classes")));
                    }
                    cross_entropy_into(row, c, 1.0 / n, &mut g)
                }
                (LabelKind::Regression, Label::Score(target)) => {
                    let diff = row[0] - target;
                    g[0] = 2.0 * diff / n;
                    diff * diff
                }
                (LabelKind::Span, Label::Span(start, end)) => {
                    let len = self.max_seq_len;
                    if start >= len || end >= len {
                        return Err(Error::Data(format!("span ({start}, {end}) exceeds max_seq_len {len}")));
                    }
                    let (gs, ge) = g.split_at_mut(len);
                    let ls = cross_entropy_into(row.slice(ndarray::s![..len]), start, 0.5 / n, gs);
                    let le = cross_entropy_into(row.slice(ndarray::s![len..]), end, 0.5 / n, ge);
                    0.5 * (ls + le)
                }
                (kind, other) => {
                    return Err(Error::Data(format!("label {other:?} does not fit {kind:?}")));
                }
            };
            grad.row_mut(i).assign(&ArrayView1::from(&g[..]));
        }

        Ok(Loss { value: total / n, grad })
    }

    fn extract_predictions(&self, outputs: &Outputs) -> Vec<Label> {
        outputs
            .logits
            .rows()
            .into_iter()
            .map(|row| match self.descriptor.label_kind {
                LabelKind::Classification { .. } => Label::Class(argmax(row)),
                LabelKind::Regression => Label::Score(row[0]),
                LabelKind::Span => {
                    let len = self.max_seq_len.min(row.len() / 2);
                    let start = argmax(row.slice(ndarray::s![..len]));
                    let end = start + argmax(row.slice(ndarray::s![len + start..2 * len]));
                    Label::Span(start, end)
                }
            })
            .collect()
    }

    fn extract_labels(&self, batch: &Batch) -> Result<Vec<Label>> {
        batch.labels.clone().ok_or_else(|| Error::Data("batch has no labels".into()))
    }

    fn compute_metric(&self, predictions: &[Label], labels: &[Label]) -> Result<MetricReport> {
        self.descriptor.metric.compute(predictions, labels)
    }

    fn example_ids(&self) -> &[String] {
        &self.example_ids
    }
}
