//! GLUE / SQuAD evaluation metrics
//!
//! - Classification: accuracy, binary F1, Matthews correlation
//! - Regression: Pearson and Spearman correlation
//! - Span extraction: exact match and position-overlap F1

use crate::data::Label;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named metric values for one evaluation
pub type MetricReport = BTreeMap<String, f64>;

/// Which metric family a task reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// `accuracy`
    Accuracy,
    /// `accuracy` and `f1` (positive class 1)
    AccuracyF1,
    /// `matthews_correlation`
    Matthews,
    /// `pearson` and `spearmanr`
    PearsonSpearman,
    /// `exact` and `f1` over answer spans
    Span,
}

impl MetricKind {
    /// Compute the metric over aligned predictions and labels
    pub fn compute(&self, predictions: &[Label], labels: &[Label]) -> Result<MetricReport> {
        if predictions.len() != labels.len() {
            return Err(Error::CountMismatch { expected: labels.len(), actual: predictions.len() });
        }
        if labels.is_empty() {
            return Err(Error::Data("cannot compute a metric over zero examples".into()));
        }

        let mut report = MetricReport::new();
        match self {
            MetricKind::Accuracy => {
                let (p, l) = (classes(predictions)?, classes(labels)?);
                report.insert("accuracy".into(), accuracy(&p, &l));
            }
            MetricKind::AccuracyF1 => {
                let (p, l) = (classes(predictions)?, classes(labels)?);
                report.insert("accuracy".into(), accuracy(&p, &l));
                report.insert("f1".into(), f1_binary(&p, &l));
            }
            MetricKind::Matthews => {
                let (p, l) = (classes(predictions)?, classes(labels)?);
                report.insert("matthews_correlation".into(), matthews_corrcoef(&p, &l));
            }
            MetricKind::PearsonSpearman => {
                let (p, l) = (scores(predictions)?, scores(labels)?);
                report.insert("pearson".into(), pearson(&p, &l));
                report.insert("spearmanr".into(), spearman(&p, &l));
            }
            MetricKind::Span => {
                let (p, l) = (spans(predictions)?, spans(labels)?);
                report.insert("exact".into(), exact_match(&p, &l));
                report.insert("f1".into(), span_f1(&p, &l));
            }
        }
        Ok(report)
    }
}

fn classes(labels: &[Label]) -> Result<Vec<usize>> {
    labels
        .iter()
        .map(|l| match l {
            Label::Class(c) => Ok(*c),
            other => Err(Error::Data(format!("expected a class label, got {other:?}"))),
        })
        .collect()
}

fn scores(labels: &[Label]) -> Result<Vec<f64>> {
    labels
        .iter()
        .map(|l| match l {
            Label::Score(s) => Ok(f64::from(*s)),
            Label::Class(c) => Ok(*c as f64),
            other => Err(Error::Data(format!("expected a score, got {other:?}"))),
        })
        .collect()
}

fn spans(labels: &[Label]) -> Result<Vec<(usize, usize)>> {
    labels
        .iter()
        .map(|l| match l {
            Label::Span(s, e) => Ok((*s, *e)),
            other => Err(Error::Data(format!("expected a span, got {other:?}"))),
        })
        .collect()
}

/// Fraction of exact matches
pub fn accuracy(predictions: &[usize], labels: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions.iter().zip(labels).filter(|(p, l)| p == l).count();
    correct as f64 / labels.len() as f64
}

/// F1 of the positive class (label 1)
pub fn f1_binary(predictions: &[usize], labels: &[usize]) -> f64 {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (&p, &l) in predictions.iter().zip(labels) {
        match (p == 1, l == 1) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => {}
        }
    }
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        0.0
    } else {
        2.0 * tp as f64 / denom as f64
    }
}

/// Multiclass Matthews correlation coefficient; 0 when undefined
pub fn matthews_corrcoef(predictions: &[usize], labels: &[usize]) -> f64 {
    let k = predictions.iter().chain(labels).copied().max().map_or(0, |m| m + 1);
    let mut pred_counts = vec![0f64; k];
    let mut true_counts = vec![0f64; k];
    let mut correct = 0f64;
    for (&p, &l) in predictions.iter().zip(labels) {
        pred_counts[p] += 1.0;
        true_counts[l] += 1.0;
        if p == l {
            correct += 1.0;
        }
    }
    let s = labels.len() as f64;
    let pt: f64 = pred_counts.iter().zip(&true_counts).map(|(p, t)| p * t).sum();
    let pp: f64 = pred_counts.iter().map(|p| p * p).sum();
    let tt: f64 = true_counts.iter().map(|t| t * t).sum();
    let denom = ((s * s - pp) * (s * s - tt)).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (correct * s - pt) / denom
    }
}

/// Pearson correlation; 0 when either side is constant
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let mean_x = x.iter().take(n).sum::<f64>() / n as f64;
    let mean_y = y.iter().take(n).sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}

/// Average ranks (1-based), ties sharing the mean of their positions
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Spearman rank correlation
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&ranks(x), &ranks(y))
}

/// Fraction of spans predicted exactly
pub fn exact_match(predictions: &[(usize, usize)], labels: &[(usize, usize)]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let hits = predictions.iter().zip(labels).filter(|(p, l)| p == l).count();
    hits as f64 / labels.len() as f64
}

/// Mean F1 of position overlap between predicted and gold spans
///
/// `(0, 0)` denotes "no answer"; it scores 1 only against another `(0, 0)`.
pub fn span_f1(predictions: &[(usize, usize)], labels: &[(usize, usize)]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = predictions
        .iter()
        .zip(labels)
        .map(|(&(ps, pe), &(ls, le))| {
            let no_answer = |s: usize, e: usize| s == 0 && e == 0;
            if no_answer(ps, pe) || no_answer(ls, le) {
                return if no_answer(ps, pe) && no_answer(ls, le) { 1.0 } else { 0.0 };
            }
            if pe < ps || le < ls {
                return 0.0;
            }
            let overlap = (pe.min(le) + 1).saturating_sub(ps.max(ls));
            if overlap == 0 {
                return 0.0;
            }
            let precision = overlap as f64 / (pe - ps + 1) as f64;
            let recall = overlap as f64 / (le - ls + 1) as f64;
            2.0 * precision * recall / (precision + recall)
        })
        .sum();
    total / labels.len() as f64
}
