//! Directory-backed checkpoint store

use crate::io::ModelState;
use crate::optim::ScheduleState;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static CHECKPOINT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^epoch_(\d+)_step_(\d+)\.ckpt\.json$").expect("Invalid checkpoint name regex")
});

/// Self-contained snapshot of a run at `(epoch, step)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: usize,
    pub step: usize,
    pub model_weights: ModelState,
    pub optimizer_state: serde_json::Value,
    pub schedule_state: ScheduleState,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(
        epoch: usize,
        step: usize,
        model_weights: ModelState,
        optimizer_state: serde_json::Value,
        schedule_state: ScheduleState,
    ) -> Self {
        Self { epoch, step, model_weights, optimizer_state, schedule_state, saved_at: Utc::now() }
    }

    /// `(epoch, step)` identity, ordered lexicographically
    pub fn position(&self) -> (usize, usize) {
        (self.epoch, self.step)
    }
}

/// Writes `epoch_{e}_step_{s}.ckpt.json` files and resolves the latest one
///
/// Entries are never modified or deleted once written.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, epoch: usize, step: usize) -> PathBuf {
        self.dir.join(format!("epoch_{epoch}_step_{step}.ckpt.json"))
    }

    /// Persist a checkpoint atomically and return its path
    ///
    /// # Errors
    ///
    /// [`Error::CheckpointExists`] if an entry for the same `(epoch, step)`
    /// is already present; the existing file is left untouched.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| Error::Storage { path: self.dir.display().to_string(), source })?;

        let path = self.path_for(checkpoint.epoch, checkpoint.step);
        let json = serde_json::to_vec(checkpoint)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(&path).map_err(|e| match e.error.kind() {
            std::io::ErrorKind::AlreadyExists => Error::CheckpointExists { path: path.display().to_string() },
            _ => Error::Io(e.error),
        })?;

        log::info!("saved checkpoint {}", path.display());
        Ok(path)
    }

    /// Read one checkpoint file
    pub fn load(path: impl AsRef<Path>) -> Result<Checkpoint> {
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `(epoch, step, path)` for every checkpoint-named file, ascending
    pub fn list(&self) -> Result<Vec<(usize, usize, PathBuf)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut found = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".ckpt.json") {
                continue;
            }
            match parse_name(name) {
                Some((epoch, step)) => found.push((epoch, step, path)),
                None => log::warn!("skipping malformed checkpoint name {}", path.display()),
            }
        }
        found.sort();
        Ok(found)
    }

    /// Newest readable checkpoint, or `None` if there is none
    ///
    /// Candidates are tried from the greatest `(epoch, step)` down; entries
    /// that fail to parse or whose payload disagrees with the file name are
    /// skipped with a warning.
    pub fn load_latest(&self) -> Result<Option<Checkpoint>> {
        self.load_latest_where(|_, _| true)
    }

    /// Like [`load_latest`](Self::load_latest), considering only positions
    /// accepted by `accept(epoch, step)`
    pub fn load_latest_where(&self, accept: impl Fn(usize, usize) -> bool) -> Result<Option<Checkpoint>> {
        for (epoch, step, path) in self.list()?.into_iter().rev() {
            if !accept(epoch, step) {
                log::debug!("passing over checkpoint {}", path.display());
                continue;
            }
            match Self::load(&path) {
                Ok(ckpt) if ckpt.position() == (epoch, step) => {
                    log::info!("found checkpoint at epoch {epoch} step {step}");
                    return Ok(Some(ckpt));
                }
                Ok(ckpt) => log::warn!(
                    "skipping {}: payload records epoch {} step {}",
                    path.display(),
                    ckpt.epoch,
                    ckpt.step
                ),
                Err(e) => log::warn!("skipping unreadable checkpoint {}: {e}", path.display()),
            }
        }
        Ok(None)
    }
}

fn parse_name(name: &str) -> Option<(usize, usize)> {
    let caps = CHECKPOINT_NAME.captures(name)?;
    let epoch = caps.get(1)?.as_str().parse().ok()?;
    let step = caps.get(2)?.as_str().parse().ok()?;
    Some((epoch, step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name() {
        assert_eq!(parse_name("epoch_3_step_120.ckpt.json"), Some((3, 120)));
        assert_eq!(parse_name("epoch_x_step_1.ckpt.json"), None);
        assert_eq!(parse_name("epoch_1_step_1.ckpt.json.tmp"), None);
        // overflow
        assert_eq!(parse_name("epoch_99999999999999999999999_step_1.ckpt.json"), None);
    }

    #[test]
    fn test_path_for() {
        let store = CheckpointStore::new("/tmp/run");
        assert_eq!(store.path_for(2, 40), PathBuf::from("/tmp/run/epoch_2_step_40.ckpt.json"));
    }
}
