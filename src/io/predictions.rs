//! Per-epoch prediction files and GLUE submission export

use crate::data::Label;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `{dir}/epoch_{epoch}_testset_evaluation.json`
pub fn testset_predictions_path(dir: &Path, epoch: usize) -> PathBuf {
    dir.join(format!("epoch_{epoch}_testset_evaluation.json"))
}

/// Write predictions as a JSON object keyed by example id
pub fn write_predictions(path: &Path, predictions: &BTreeMap<String, Label>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(predictions)
        .map_err(|e| Error::Serialization(format!("predictions: {e}")))?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a file written by [`write_predictions`]
pub fn read_predictions(path: &Path) -> Result<BTreeMap<String, Label>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| Error::Serialization(format!("predictions: {e}")))
}

/// Write a GLUE leaderboard TSV (`index\tprediction`)
///
/// Rows are ordered by numeric index when every id is an integer, otherwise
/// lexicographically. Class predictions are mapped through `label_names`
/// when provided; scores are written with three decimals.
pub fn write_submission_tsv(
    path: &Path,
    predictions: &BTreeMap<String, Label>,
    label_names: &[String],
) -> Result<()> {
    let mut rows: Vec<(&String, &Label)> = predictions.iter().collect();
    let numeric: Option<Vec<u64>> = rows.iter().map(|(id, _)| id.parse::<u64>().ok()).collect();
    if let Some(keys) = numeric {
        let mut keyed: Vec<(u64, (&String, &Label))> = keys.into_iter().zip(rows).collect();
        keyed.sort_by_key(|(k, _)| *k);
        rows = keyed.into_iter().map(|(_, row)| row).collect();
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(path)?;
    writeln!(out, "index\tprediction")?;
    for (id, label) in rows {
        let value = match label {
            Label::Class(c) => label_names.get(*c).cloned().unwrap_or_else(|| c.to_string()),
            Label::Score(s) => format!("{s:.3}"),
            Label::Span(start, end) => format!("{start}-{end}"),
        };
        writeln!(out, "{id}\t{value}")?;
    }
    Ok(())
}
