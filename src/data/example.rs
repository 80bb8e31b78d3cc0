//! Labeled examples and their JSONL representation

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A gold label or a model prediction
///
/// Serialized untagged: an integer class, a float score, or a
/// `[start, end]` span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Class(usize),
    Score(f32),
    Span(usize, usize),
}

/// One input record: pre-embedded feature vectors per input field
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub id: String,
    pub fields: HashMap<String, Vec<f32>>,
    pub label: Option<Label>,
}

impl Example {
    /// Parse one JSON object, keeping only `input_fields`
    ///
    /// The id comes from `idx` (or `id`), falling back to the line number.
    /// A missing, null or negative `label` marks the example as unlabeled,
    /// which is how GLUE test splits are distributed.
    pub fn from_json(value: &Value, input_fields: &[String], line: usize) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Data(format!("line {line}: expected a JSON object")))?;

        let id = match obj.get("idx").or_else(|| obj.get("id")) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => line.to_string(),
        };

        let mut fields = HashMap::new();
        for name in input_fields {
            let raw = obj
                .get(name)
                .and_then(Value::as_array)
                .ok_or_else(|| Error::Data(format!("line {line}: missing field `{name}`")))?;
            let vector = raw
                .iter()
                .map(|v| v.as_f64().map(|f| f as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or_else(|| Error::Data(format!("line {line}: field `{name}` is not numeric")))?;
            fields.insert(name.clone(), vector);
        }

        let label = match obj.get("label") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) if n.as_i64().is_some_and(|v| v < 0) => None,
            Some(v) => Some(
                serde_json::from_value::<Label>(v.clone())
                    .map_err(|e| Error::Data(format!("line {line}: bad label: {e}")))?,
            ),
        };

        Ok(Self { id, fields, label })
    }

    /// Concatenate input fields, each truncated or zero-padded to `max_seq_len`
    pub fn features(&self, input_fields: &[String], max_seq_len: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(input_fields.len() * max_seq_len);
        for name in input_fields {
            let values = self.fields.get(name).map(Vec::as_slice).unwrap_or(&[]);
            let take = values.len().min(max_seq_len);
            out.extend_from_slice(&values[..take]);
            out.resize(out.len() + (max_seq_len - take), 0.0);
        }
        out
    }
}

/// Read a JSONL file of examples; blank lines are skipped
pub fn read_jsonl(path: &Path, input_fields: &[String]) -> Result<Vec<Example>> {
    let file = File::open(path)
        .map_err(|e| Error::Data(format!("cannot open {}: {e}", path.display())))?;
    let mut examples = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .map_err(|e| Error::Data(format!("{}:{}: {e}", path.display(), i + 1)))?;
        examples.push(Example::from_json(&value, input_fields, i + 1)?);
    }
    log::debug!("read {} examples from {}", examples.len(), path.display());
    Ok(examples)
}
