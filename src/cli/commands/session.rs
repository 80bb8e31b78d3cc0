//! Turning a run specification into a ready controller

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::{apply_overrides, load_config, validate_config, RunArgs, RunSpec, TrackingBackend};
use crate::data::{read_jsonl, DataLoader, DataSource};
use crate::io::load_model_state;
use crate::nn::{ModelRegistry, ModelSpec};
use crate::optim::{build_scheduler, warmup_steps_for, AdamW};
use crate::task::{GenericTask, TaskDescriptor, TaskRegistry};
use crate::tracking::{ExperimentLogger, InMemoryLogger, JsonlLogger, NoopLogger};
use crate::train::{RunController, TrainConfig};
use crate::{Error, Result};
use std::path::Path;

/// Loaded splits for one run
pub(super) struct Splits {
    pub train: Option<DataLoader>,
    pub validation: Option<DataLoader>,
    pub test: Option<DataLoader>,
}

/// Everything a command needs: the effective spec, its task and its data
pub(super) struct Session {
    pub spec: RunSpec,
    pub descriptor: TaskDescriptor,
    pub splits: Splits,
}

impl Session {
    /// Load the config, apply overrides and re-validate, then read the data
    pub fn open(args: &RunArgs) -> Result<Self> {
        let mut spec = load_config(&args.config_path)?;
        apply_overrides(&mut spec, args);
        validate_config(&spec)?;

        let tasks = TaskRegistry::with_defaults();
        let descriptor = tasks.get(&spec.task.name)?.clone();

        let params = &spec.train;
        let load = |path: &Path, batch_size: usize| -> Result<DataLoader> {
            let examples = read_jsonl(path, &descriptor.input_fields)?;
            Ok(DataLoader::new(examples, descriptor.input_fields.clone(), params.max_seq_len, batch_size))
        };
        let splits = Splits {
            train: spec
                .data
                .train
                .as_deref()
                .map(|p| load(p, params.train_batch).map(|l| l.shuffled(params.seed)))
                .transpose()?,
            validation: spec.data.validation.as_deref().map(|p| load(p, params.val_batch)).transpose()?,
            test: spec.data.test.as_deref().map(|p| load(p, params.test_batch)).transpose()?,
        };

        Ok(Self { spec, descriptor, splits })
    }

    /// Build model, optimizer, schedule, logger and store into a controller
    pub fn controller(&self) -> Result<RunController> {
        let task_spec = &self.spec.task;
        let params = &self.spec.train;

        let pretrained = task_spec.model_path.as_ref().map(load_model_state).transpose()?;
        let model_spec = ModelSpec {
            input_dim: self.descriptor.input_width(params.max_seq_len),
            hidden_size: task_spec.hidden_size,
            num_layers: task_spec.num_layers,
            num_outputs: self.descriptor.output_width(params.max_seq_len),
            seed: params.seed,
            lora: task_spec.lora.clone(),
            pretrained,
        };
        let model = ModelRegistry::with_defaults().build(&task_spec.model, &model_spec)?;

        let test_ids = self.splits.test.as_ref().map(DataSource::example_ids).unwrap_or_default();
        let task = GenericTask::new(self.descriptor.clone(), params.max_seq_len).with_example_ids(test_ids);

        let train_batches = self.splits.train.as_ref().map_or(0, DataSource::num_batches);
        let warmup = warmup_steps_for(train_batches, params.grad_accum, params.epochs, params.warmup_ratio);
        let scheduler = build_scheduler(params.scheduler, params.learning_rate, warmup, params.warmup_init_lr);
        log::debug!("{} schedule: {warmup} warmup steps over {train_batches} batches", params.scheduler);

        let mut config = TrainConfig::new()
            .with_epochs(params.epochs)
            .with_grad_accum(params.grad_accum)
            .with_checkpoint_steps(params.checkpoint_steps)
            .with_output_dir(&params.output_dir);
        if let Some(max_norm) = params.max_grad_norm {
            config = config.with_grad_clip(max_norm);
        }
        if params.resume_from_checkpoint {
            config = config.with_resume(params.resume_granularity);
        }

        let mut controller = RunController::new(
            model,
            Box::new(AdamW::with_weight_decay(params.learning_rate, params.weight_decay)),
            scheduler,
            Box::new(task),
            config,
        )
        .with_logger(self.logger()?);
        if let Some(dir) = &params.checkpoint_path {
            controller = controller.with_store(CheckpointStore::new(dir));
        }
        Ok(controller)
    }

    fn logger(&self) -> Result<Box<dyn ExperimentLogger>> {
        let tracking = &self.spec.tracking;
        let logger: Box<dyn ExperimentLogger> = match (tracking.backend, &tracking.path) {
            (TrackingBackend::None, _) => Box::new(NoopLogger),
            (TrackingBackend::Memory, _) => Box::new(InMemoryLogger::new()),
            (TrackingBackend::Jsonl, Some(path)) => Box::new(JsonlLogger::create(path)?),
            (TrackingBackend::Jsonl, None) => {
                return Err(Error::ConfigError("tracking backend jsonl needs tracking.path".into()))
            }
        };
        Ok(logger)
    }

    /// The checkpoint `eval`/`infer` should use: explicit, else latest in store
    pub fn checkpoint(&self) -> Result<Checkpoint> {
        if let Some(path) = &self.spec.eval.checkpoint {
            return CheckpointStore::load(path);
        }
        let Some(dir) = &self.spec.train.checkpoint_path else {
            return Err(Error::ConfigError(
                "no checkpoint to load: set eval.checkpoint or train.checkpoint_path".into(),
            ));
        };
        CheckpointStore::new(dir)
            .load_latest()?
            .ok_or_else(|| Error::ConfigError(format!("no checkpoint found in {}", dir.display())))
    }
}
