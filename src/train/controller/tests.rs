use super::*;
use crate::checkpoint::CheckpointStore;
use crate::data::{Batch, Label};
use crate::io::read_predictions;
use crate::nn::{Model, Param, SequenceClassifier};
use crate::optim::{AdamW, LRScheduler, LinearWarmupLR, Optimizer, ScheduleState, SGD};
use crate::task::{GenericTask, MetricKind, TaskDescriptor};
use crate::tracking::InMemoryLogger;
use crate::train::{Interrupter, ResumeGranularity, TrainConfig};
use crate::Error;
use approx::assert_abs_diff_eq;
use ndarray::Array2;
use std::cell::Cell;
use std::rc::Rc;

/// SGD that counts its steps and can raise the interrupter after N of them
struct CountingOptimizer {
    inner: SGD,
    steps: Rc<Cell<usize>>,
    stop_after: Option<(usize, Interrupter)>,
}

impl Optimizer for CountingOptimizer {
    fn step(&mut self, params: &mut [&mut Param]) {
        self.inner.step(params);
        self.steps.set(self.steps.get() + 1);
        if let Some((n, interrupter)) = &self.stop_after {
            if self.steps.get() == *n {
                interrupter.stop();
            }
        }
    }

    fn lr(&self) -> f32 {
        self.inner.lr()
    }

    fn set_lr(&mut self, lr: f32) {
        self.inner.set_lr(lr);
    }

    fn state(&self) -> serde_json::Value {
        self.inner.state()
    }

    fn load_state(&mut self, state: &serde_json::Value) -> crate::Result<()> {
        self.inner.load_state(state)
    }
}

struct CountingScheduler {
    inner: LinearWarmupLR,
    steps: Rc<Cell<usize>>,
}

impl LRScheduler for CountingScheduler {
    fn get_lr(&self) -> f32 {
        self.inner.get_lr()
    }

    fn step(&mut self) {
        self.inner.step();
        self.steps.set(self.steps.get() + 1);
    }

    fn state(&self) -> ScheduleState {
        self.inner.state()
    }

    fn load_state(&mut self, state: &ScheduleState) {
        self.inner.load_state(state);
    }
}

struct Counters {
    optimizer: Rc<Cell<usize>>,
    scheduler: Rc<Cell<usize>>,
}

fn descriptor() -> TaskDescriptor {
    TaskDescriptor::classification("toy", &["x"], 2, MetricKind::AccuracyF1)
}

/// `n` batches of two examples, label = sign of the first feature
fn batches(n: usize, offset: usize) -> Vec<Batch> {
    (0..n)
        .map(|b| {
            let ids = (0..2).map(|i| (offset + 2 * b + i).to_string()).collect();
            let features = Array2::from_shape_fn((2, 4), |(i, j)| {
                (((offset + 2 * b + i) * 7 + j * 3) as f32 * 0.61).sin()
            });
            let labels = features.rows().into_iter().map(|r| Label::Class(usize::from(r[0] > 0.0))).collect();
            Batch::new(ids, features, Some(labels))
        })
        .collect()
}

fn test_ids(n: usize) -> Vec<String> {
    batches(n, 100).iter().flat_map(|b| b.ids.clone()).collect()
}

fn counting_controller(config: TrainConfig, stop_after: Option<(usize, Interrupter)>) -> (RunController, Counters) {
    let counters = Counters { optimizer: Rc::new(Cell::new(0)), scheduler: Rc::new(Cell::new(0)) };
    let optimizer = CountingOptimizer {
        inner: SGD::new(0.1, 0.0),
        steps: Rc::clone(&counters.optimizer),
        stop_after,
    };
    let scheduler = CountingScheduler { inner: LinearWarmupLR::new(0.1, 2), steps: Rc::clone(&counters.scheduler) };
    let task = GenericTask::new(descriptor(), 4).with_example_ids(test_ids(2));
    let controller = RunController::new(
        Box::new(SequenceClassifier::linear_probe(4, 2, 7)),
        Box::new(optimizer),
        Box::new(scheduler),
        Box::new(task),
        config,
    );
    (controller, counters)
}

fn adamw_controller(config: TrainConfig, store: &CheckpointStore) -> RunController {
    let task = GenericTask::new(descriptor(), 4);
    RunController::new(
        Box::new(SequenceClassifier::new(4, 6, 1, 2, 3)),
        Box::new(AdamW::default_params(1e-2)),
        Box::new(LinearWarmupLR::new(1e-2, 3)),
        Box::new(task),
        config,
    )
    .with_store(store.clone())
}

#[test]
fn test_grad_accum_two_over_four_batches() {
    let config = TrainConfig::new().with_epochs(1).with_grad_accum(2);
    let (mut controller, counters) = counting_controller(config, None);

    let result = controller.run(&batches(4, 0), None, None).expect("run should succeed");

    assert_eq!(counters.optimizer.get(), 2);
    assert_eq!(counters.scheduler.get(), 2);
    assert_eq!(result.final_step, 2);
    assert_eq!(result.global_step, 2);
    assert!(result.final_loss > 0.0);
}

#[test]
fn test_partial_window_steps_at_epoch_end() {
    let config = TrainConfig::new().with_epochs(2).with_grad_accum(3);
    let (mut controller, counters) = counting_controller(config, None);

    let result = controller.run(&batches(4, 0), None, None).expect("run should succeed");

    // 3 + 1 batches per epoch
    assert_eq!(counters.optimizer.get(), 4);
    assert_eq!(counters.scheduler.get(), counters.optimizer.get());
    assert_eq!(result.final_step, 2);
    assert_eq!(controller.global_step(), 4);
}

#[test]
fn test_schedule_rate_reaches_optimizer() {
    let (mut controller, _) = counting_controller(TrainConfig::new(), None);
    // step 0 of a 2-step warmup
    assert_abs_diff_eq!(controller.lr(), 1e-10);

    controller.run(&batches(3, 0), None, None).expect("run should succeed");
    assert_eq!(controller.lr(), controller.scheduler().get_lr());
    assert_abs_diff_eq!(controller.lr(), 0.1);
}

#[test]
fn test_periodic_and_post_epoch_checkpoints() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path().join("ckpt"));
    let config = TrainConfig::new().with_epochs(2).with_checkpoint_steps(2);
    let (controller, _) = counting_controller(config, None);
    let mut controller = controller.with_store(store.clone());

    controller.run(&batches(3, 0), None, None).expect("run should succeed");

    let saved: Vec<_> = store.list().expect("list").into_iter().map(|(e, s, _)| (e, s)).collect();
    assert_eq!(saved, vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
    let latest = store.load_latest().expect("load").expect("present");
    assert_eq!(latest.model_weights, controller.model().state());
}

#[test]
fn test_validation_report_and_logging() {
    let logger = InMemoryLogger::new();
    let (controller, _) = counting_controller(TrainConfig::new().with_epochs(2), None);
    let mut controller = controller.with_logger(Box::new(logger.clone()));
    let val = batches(2, 50);

    let result = controller.run(&batches(4, 0), Some(&val), None).expect("run should succeed");

    assert!(result.val_metrics.contains_key("val/loss"));
    assert!(result.val_metrics.contains_key("val/accuracy"));
    assert!(result.val_metrics.contains_key("val/f1"));
    assert!(result.best_val_loss.is_some());
    // validation leaves the model in eval mode
    assert!(!controller.model().is_training());

    assert_eq!(logger.series("train/loss").len(), 8);
    assert_eq!(logger.series("val/loss").len(), 2);
    let steps: Vec<usize> = logger.series("train/lr").iter().map(|(s, _)| *s).collect();
    assert_eq!(steps, (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_validation_is_forward_only() {
    let (mut controller, counters) = counting_controller(TrainConfig::new(), None);
    let before = controller.model().state();

    let report = controller
        .evaluate(&batches(3, 0), crate::train::Phase::Validate)
        .expect("evaluate should succeed");

    assert_eq!(counters.optimizer.get(), 0);
    assert_eq!(controller.model().state(), before);
    assert!(report["val/loss"] > 0.0);
}

#[test]
fn test_test_predictions_written_per_epoch() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let config = TrainConfig::new().with_epochs(2).with_output_dir(dir.path());
    let (mut controller, _) = counting_controller(config, None);
    let test: Vec<Batch> = batches(2, 100)
        .into_iter()
        .map(|b| Batch::new(b.ids, b.features, None))
        .collect();

    let result = controller.run(&batches(2, 0), None, Some(&test)).expect("run should succeed");

    assert_eq!(result.prediction_files.len(), 2);
    assert!(dir.path().join("epoch_1_testset_evaluation.json").exists());
    let predictions = read_predictions(&result.prediction_files[0]).expect("read");
    let keys: Vec<String> = predictions.keys().cloned().collect();
    let mut expected = test_ids(2);
    expected.sort();
    assert_eq!(keys, expected);
}

#[test]
fn test_prediction_count_mismatch() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let config = TrainConfig::new().with_output_dir(dir.path());
    let (mut controller, _) = counting_controller(config, None);

    // task declares 4 examples, test split yields 6
    let err = controller.run(&batches(2, 0), None, Some(&batches(3, 100))).err();
    assert!(matches!(err, Some(Error::CountMismatch { expected: 4, actual: 6 })));
}

#[test]
fn test_empty_train_split_is_fatal() {
    let (mut controller, _) = counting_controller(TrainConfig::new(), None);
    let err = controller.run(&Vec::<Batch>::new(), None, None).err();
    assert!(matches!(err, Some(Error::EmptyPhase { .. })));
}

#[test]
fn test_interrupt_saves_and_propagates() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let interrupter = Interrupter::new();
    let config = TrainConfig::new().with_epochs(3);
    let (controller, counters) = counting_controller(config, Some((1, interrupter.clone())));
    let mut controller = controller.with_store(store.clone()).with_interrupter(interrupter);

    let err = controller.run(&batches(4, 0), None, None).err();

    assert!(matches!(err, Some(Error::Interrupted { epoch: 0, step: 1 })));
    assert!(controller.state().is_interrupted);
    assert_eq!(counters.optimizer.get(), 1);
    let latest = store.load_latest().expect("load").expect("interrupt checkpoint");
    assert_eq!(latest.position(), (0, 1));
    assert_eq!(latest.schedule_state.step_count, 1);
}

#[test]
fn test_interrupt_without_store_still_propagates() {
    let interrupter = Interrupter::new();
    interrupter.stop();
    let (controller, counters) = counting_controller(TrainConfig::new(), None);
    let mut controller = controller.with_interrupter(interrupter);

    let err = controller.run(&batches(2, 0), None, None).err();
    assert!(matches!(err, Some(Error::Interrupted { epoch: 0, step: 0 })));
    assert_eq!(counters.optimizer.get(), 0);
}

#[test]
fn test_resume_skips_completed_epochs() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let (first, _) = counting_controller(TrainConfig::new().with_epochs(1), None);
    first.with_store(store.clone()).run(&batches(4, 0), None, None).expect("first run");

    let config = TrainConfig::new().with_epochs(2).with_resume(ResumeGranularity::Epoch);
    let (second, counters) = counting_controller(config, None);
    let mut second = second.with_store(store);
    let result = second.run(&batches(4, 0), None, None).expect("resumed run");

    assert_eq!(result.resumed_from, Some((0, 4)));
    assert_eq!(counters.optimizer.get(), 4);
    assert_eq!(result.final_epoch, 1);
    assert_eq!(result.global_step, 8);
    // schedule continued from the checkpoint, not from zero
    assert_eq!(second.scheduler().state().step_count, 8);
}

#[test]
fn test_resume_granularity_after_mid_epoch_interrupt() {
    // epoch mode has no epoch boundary to return to and starts over
    for (granularity, expected_steps, resumed_from) in
        [(ResumeGranularity::Epoch, 4, None), (ResumeGranularity::Step, 3, Some((0, 1)))]
    {
        let dir = tempfile::tempdir().expect("tempdir should succeed");
        let store = CheckpointStore::new(dir.path());
        let interrupter = Interrupter::new();
        let (first, _) = counting_controller(TrainConfig::new(), Some((1, interrupter.clone())));
        let mut first = first.with_store(store.clone()).with_interrupter(interrupter);
        assert!(first.run(&batches(4, 0), None, None).is_err());

        let config = TrainConfig::new().with_resume(granularity);
        let (second, counters) = counting_controller(config, None);
        let result = second.with_store(store).run(&batches(4, 0), None, None).expect("resumed run");

        assert_eq!(counters.optimizer.get(), expected_steps, "{granularity:?}");
        assert_eq!(result.final_step, 4, "{granularity:?}");
        assert_eq!(result.resumed_from, resumed_from, "{granularity:?}");
        assert_eq!(result.global_step, 4, "{granularity:?}");
    }
}

#[test]
fn test_epoch_resume_returns_to_last_closed_epoch() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let interrupter = Interrupter::new();
    // epoch 0 closes at step 4; stop two steps into epoch 1
    let (first, _) = counting_controller(TrainConfig::new().with_epochs(2), Some((6, interrupter.clone())));
    let mut first = first.with_store(store.clone()).with_interrupter(interrupter);
    let err = first.run(&batches(4, 0), None, None).err();
    assert!(matches!(err, Some(Error::Interrupted { epoch: 1, step: 2 })));

    let config = TrainConfig::new().with_epochs(2).with_resume(ResumeGranularity::Epoch);
    let (second, counters) = counting_controller(config, None);
    let mut second = second.with_store(store.clone());
    let result = second.run(&batches(4, 0), None, None).expect("resumed run");

    assert_eq!(result.resumed_from, Some((0, 4)));
    assert_eq!(counters.optimizer.get(), 4);
    assert_eq!(result.global_step, 8);
    assert_eq!(second.scheduler().state().step_count, 8);
    // the abandoned mid-epoch entry is still there, untouched
    let stale = CheckpointStore::load(store.path_for(1, 2)).expect("load should succeed");
    assert_eq!(stale.schedule_state.step_count, 6);
}

#[test]
fn test_epoch_resume_after_mid_epoch_interrupt_matches_uninterrupted_run() {
    let straight_dir = tempfile::tempdir().expect("tempdir should succeed");
    let mut straight = adamw_controller(TrainConfig::new().with_epochs(2), &CheckpointStore::new(straight_dir.path()));
    let train = batches(4, 0);
    straight.run(&train, None, None).expect("straight run");

    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let interrupter = Interrupter::new();
    let mut first = stopping_controller(TrainConfig::new().with_epochs(2), &store, 6, &interrupter);
    assert!(matches!(first.run(&train, None, None), Err(Error::Interrupted { epoch: 1, step: 2 })));

    let config = TrainConfig::new().with_epochs(2).with_resume(ResumeGranularity::Epoch);
    let mut second = adamw_controller(config, &store);
    let result = second.run(&train, None, None).expect("resumed run");

    assert_eq!(result.resumed_from, Some((0, 4)));
    assert_same_training_state(&straight, &second);
}

#[test]
fn test_step_resume_mid_epoch_matches_uninterrupted_run() {
    let straight_dir = tempfile::tempdir().expect("tempdir should succeed");
    let mut straight = adamw_controller(TrainConfig::new().with_epochs(2), &CheckpointStore::new(straight_dir.path()));
    let train = batches(4, 0);
    straight.run(&train, None, None).expect("straight run");

    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let interrupter = Interrupter::new();
    let mut first = stopping_controller(TrainConfig::new().with_epochs(2), &store, 2, &interrupter);
    assert!(matches!(first.run(&train, None, None), Err(Error::Interrupted { epoch: 0, step: 2 })));

    let config = TrainConfig::new().with_epochs(2).with_resume(ResumeGranularity::Step);
    let mut second = adamw_controller(config, &store);
    let result = second.run(&train, None, None).expect("resumed run");

    assert_eq!(result.resumed_from, Some((0, 2)));
    assert_eq!(result.global_step, 8);
    assert_same_training_state(&straight, &second);
}

#[test]
fn test_step_resume_inside_accumulation_window_matches_uninterrupted_run() {
    let config = || TrainConfig::new().with_epochs(2).with_grad_accum(2);
    let straight_dir = tempfile::tempdir().expect("tempdir should succeed");
    let mut straight = adamw_controller(config(), &CheckpointStore::new(straight_dir.path()));
    let train = batches(4, 0);
    straight.run(&train, None, None).expect("straight run");

    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let interrupter = Interrupter::new();
    // third batch's gradients are accumulated, its window never steps
    let mut first = stopping_controller(config(), &store, 3, &interrupter);
    assert!(matches!(first.run(&train, None, None), Err(Error::Interrupted { epoch: 0, step: 1 })));

    let mut second = adamw_controller(config().with_resume(ResumeGranularity::Step), &store);
    let result = second.run(&train, None, None).expect("resumed run");

    assert_eq!(result.resumed_from, Some((0, 1)));
    assert_eq!(result.global_step, 4);
    assert_eq!(second.scheduler().state().step_count, 4);
    assert_same_training_state(&straight, &second);
}

#[test]
fn test_checkpoint_steps_dividing_epoch_saves_each_position_once() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let config = TrainConfig::new().with_epochs(2).with_checkpoint_steps(2);
    let (controller, _) = counting_controller(config, None);
    let mut controller = controller.with_store(store.clone());

    controller.run(&batches(4, 0), None, None).expect("run should succeed");

    let saved: Vec<_> = store.list().expect("list").into_iter().map(|(e, s, _)| (e, s)).collect();
    assert_eq!(saved, vec![(0, 2), (0, 4), (1, 2), (1, 4)]);
    assert_eq!(controller.last_saved, Some((1, 4)));
}

#[test]
fn test_existing_checkpoint_is_never_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let (earlier, _) = counting_controller(TrainConfig::new(), None);
    let mut marker = earlier.snapshot();
    marker.epoch = 0;
    marker.step = 4;
    marker.optimizer_state = serde_json::json!({ "written_by": "earlier run" });
    store.save(&marker).expect("save should succeed");

    let (controller, _) = counting_controller(TrainConfig::new(), None);
    let mut controller = controller.with_store(store.clone());
    controller.run(&batches(4, 0), None, None).expect("run should succeed");

    let kept = CheckpointStore::load(store.path_for(0, 4)).expect("load should succeed");
    assert_eq!(kept, marker);
}

#[test]
fn test_run_without_resume_reports_no_resume_point() {
    let (mut controller, _) = counting_controller(TrainConfig::new(), None);
    let ckpt = controller.snapshot();
    controller.restore(&ckpt).expect("restore should succeed");
    assert_eq!(controller.resumed_from, Some((0, 0)));

    let result = controller.run(&batches(2, 0), None, None).expect("run should succeed");
    assert_eq!(result.resumed_from, None);
}

#[test]
fn test_second_run_forgets_earlier_resume() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let (first, _) = counting_controller(TrainConfig::new(), None);
    first.with_store(store.clone()).run(&batches(2, 0), None, None).expect("first run");

    let config = TrainConfig::new().with_epochs(2).with_resume(ResumeGranularity::Epoch);
    let (controller, _) = counting_controller(config, None);
    let mut controller = controller.with_store(store);
    let resumed = controller.run(&batches(2, 0), None, None).expect("resumed run");
    assert_eq!(resumed.resumed_from, Some((0, 2)));

    controller.config.resume_from_checkpoint = false;
    let again = controller.run(&batches(2, 0), None, None).expect("second run");
    assert_eq!(again.resumed_from, None);
}

#[test]
fn test_resume_without_checkpoint_starts_fresh() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path().join("empty"));
    let config = TrainConfig::new().with_resume(ResumeGranularity::Epoch);
    let (controller, counters) = counting_controller(config, None);

    let result = controller.with_store(store).run(&batches(2, 0), None, None).expect("run");
    assert_eq!(result.resumed_from, None);
    assert_eq!(counters.optimizer.get(), 2);
}

#[test]
fn test_resume_at_epoch_boundary_matches_uninterrupted_run() {
    let straight_dir = tempfile::tempdir().expect("tempdir should succeed");
    let mut straight = adamw_controller(TrainConfig::new().with_epochs(2), &CheckpointStore::new(straight_dir.path()));
    straight.run(&batches(4, 0), None, None).expect("straight run");

    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let store = CheckpointStore::new(dir.path());
    let interrupter = Interrupter::new();
    let mut first = adamw_controller(TrainConfig::new().with_epochs(2), &store).with_interrupter(interrupter.clone());
    // stop as soon as epoch 0 is checkpointed
    let train = batches(4, 0);
    let source = StopAfterEpoch { inner: &train, interrupter, stop_at: 1 };
    assert!(matches!(first.run(&source, None, None), Err(Error::Interrupted { epoch: 1, step: 0 })));

    let config = TrainConfig::new().with_epochs(2).with_resume(ResumeGranularity::Step);
    let mut second = adamw_controller(config, &store);
    second.run(&train, None, None).expect("resumed run");

    assert_same_training_state(&straight, &second);
}

fn assert_same_training_state(expected: &RunController, actual: &RunController) {
    let a = expected.model().state();
    let b = actual.model().state();
    assert_eq!(a.data.len(), b.data.len());
    for (x, y) in a.data.iter().zip(&b.data) {
        assert_abs_diff_eq!(x, y, epsilon = 1e-6);
    }
    assert_eq!(expected.optimizer().state(), actual.optimizer().state());
    assert_eq!(expected.scheduler().state(), actual.scheduler().state());
}

/// AdamW controller whose model raises the interrupter after `stop_at` training forwards
fn stopping_controller(
    config: TrainConfig,
    store: &CheckpointStore,
    stop_at: usize,
    interrupter: &Interrupter,
) -> RunController {
    let model = StopAfterForwards {
        inner: SequenceClassifier::new(4, 6, 1, 2, 3),
        forwards: 0,
        stop_at,
        interrupter: interrupter.clone(),
    };
    RunController::new(
        Box::new(model),
        Box::new(AdamW::default_params(1e-2)),
        Box::new(LinearWarmupLR::new(1e-2, 3)),
        Box::new(GenericTask::new(descriptor(), 4)),
        config,
    )
    .with_store(store.clone())
    .with_interrupter(interrupter.clone())
}

struct StopAfterForwards {
    inner: SequenceClassifier,
    forwards: usize,
    stop_at: usize,
    interrupter: Interrupter,
}

impl Model for StopAfterForwards {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn forward(&mut self, batch: &Batch) -> crate::Result<crate::nn::Outputs> {
        let outputs = self.inner.forward(batch)?;
        if self.inner.is_training() {
            self.forwards += 1;
            if self.forwards == self.stop_at {
                self.interrupter.stop();
            }
        }
        Ok(outputs)
    }

    fn backward(&mut self, grad_logits: &Array2<f32>) -> crate::Result<()> {
        self.inner.backward(grad_logits)
    }

    fn train_mode(&mut self, training: bool) {
        self.inner.train_mode(training);
    }

    fn is_training(&self) -> bool {
        self.inner.is_training()
    }

    fn parameters(&self) -> Vec<&Param> {
        self.inner.parameters()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Param> {
        self.inner.parameters_mut()
    }

    fn state(&self) -> crate::io::ModelState {
        self.inner.state()
    }

    fn load_state(&mut self, state: &crate::io::ModelState) -> crate::Result<()> {
        self.inner.load_state(state)
    }
}

/// Data source that raises the interrupter when asked for epoch `stop_at`
struct StopAfterEpoch<'a> {
    inner: &'a Vec<Batch>,
    interrupter: Interrupter,
    stop_at: usize,
}

impl crate::data::DataSource for StopAfterEpoch<'_> {
    fn batches(&self, epoch: usize) -> Vec<Batch> {
        if epoch == self.stop_at {
            self.interrupter.stop();
        }
        self.inner.clone()
    }

    fn num_examples(&self) -> usize {
        self.inner.iter().map(Batch::len).sum()
    }

    fn num_batches(&self) -> usize {
        self.inner.len()
    }

    fn example_ids(&self) -> Vec<String> {
        self.inner.iter().flat_map(|b| b.ids.clone()).collect()
    }
}
