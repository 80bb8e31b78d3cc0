//! Tests for LoRA layer

use super::*;
use crate::lora::LoRAConfig;
use crate::nn::Linear;
use approx::assert_abs_diff_eq;
use ndarray::Array2;
use proptest::prelude::*;

fn base_linear(d_out: usize, d_in: usize) -> Linear {
    let weight = Array2::from_shape_fn((d_out, d_in), |(i, j)| ((i * d_in + j) as f32 * 0.1).cos());
    let bias = Array2::from_shape_fn((1, d_out), |(_, j)| j as f32 * 0.01);
    Linear::new("layer", weight, Some(bias))
}

fn input(rows: usize, d_in: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, d_in), |(i, j)| ((i + 1) as f32 * 0.3 + j as f32 * 0.5).sin())
}

/// Give B non-zero values so merge has an observable effect
fn perturb_b(layer: &mut LoRALinear) {
    if let Some(b) = layer.lora_b_mut() {
        b.value_mut()
            .indexed_iter_mut()
            .for_each(|((i, j), v)| *v = ((i * 7 + j) as f32 * 0.3).cos() * 0.1);
    }
}

fn config(rank: usize, alpha: f32) -> LoRAConfig {
    LoRAConfig { rank, alpha, ..LoRAConfig::default() }
}

// ========================================================================
// PROPERTY TESTS
// ========================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(100))]

    #[test]
    fn prop_zero_b_gives_base_output(
        d_out in 2usize..10,
        d_in in 2usize..10,
        rank in 1usize..5,
    ) {
        let base = base_linear(d_out, d_in);
        let x = input(3, d_in);
        let expected = base.apply(&x).expect("base forward");

        let mut lora = LoRALinear::new("layer", base, &config(rank, 1.0), 42);
        let out = lora.forward(&x).expect("lora forward");

        for (a, b) in out.iter().zip(expected.iter()) {
            prop_assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn prop_merge_preserves_forward_output(
        d_out in 2usize..8,
        d_in in 2usize..8,
        rank in 1usize..4,
    ) {
        let mut lora = LoRALinear::new("layer", base_linear(d_out, d_in), &config(rank, 2.0), 3);
        perturb_b(&mut lora);
        let x = input(2, d_in);

        let unmerged = lora.forward(&x).expect("forward");
        lora.train(false);
        let merged = lora.forward(&x).expect("forward");

        for (a, b) in unmerged.iter().zip(merged.iter()) {
            prop_assert!((a - b).abs() < 1e-4, "merged output diverged: {} vs {}", a, b);
        }
    }

    #[test]
    fn prop_unmerge_restores_weights(
        d_out in 2usize..8,
        d_in in 2usize..8,
        rank in 1usize..4,
    ) {
        let mut lora = LoRALinear::new("layer", base_linear(d_out, d_in), &config(rank, 4.0), 9);
        perturb_b(&mut lora);
        let original = lora.base().weight().value().clone();

        lora.train(false);
        lora.train(true);

        for (a, b) in lora.base().weight().value().iter().zip(original.iter()) {
            prop_assert!((a - b).abs() < 1e-5);
        }
    }
}

// ========================================================================
// UNIT TESTS
// ========================================================================

#[test]
fn test_lora_layer_creation() {
    let lora = LoRALinear::new("layer", base_linear(4, 6), &config(2, 4.0), 0);

    assert_eq!(lora.rank(), 2);
    assert_abs_diff_eq!(lora.scale(), 2.0, epsilon = 1e-6);
    assert_eq!(lora.merge_state(), MergeState::Unmerged);
    assert_eq!(lora.lora_a().map(|a| a.shape()), Some([2, 6]));
    assert_eq!(lora.lora_b().map(|b| b.shape()), Some([4, 2]));
    assert!(lora.lora_b().is_some_and(|b| b.value().iter().all(|&v| v == 0.0)));
}

#[test]
fn test_lora_freezes_base_and_names_adapters() {
    let lora = LoRALinear::new("encoder.layer.0.dense", base_linear(3, 3), &config(2, 2.0), 0);
    let names: Vec<(String, bool)> =
        lora.params().iter().map(|p| (p.name().to_string(), p.requires_grad())).collect();

    assert_eq!(
        names,
        vec![
            ("layer.weight".to_string(), false),
            ("layer.bias".to_string(), false),
            ("encoder.layer.0.dense.lora_a".to_string(), true),
            ("encoder.layer.0.dense.lora_b".to_string(), true),
        ]
    );
}

#[test]
fn test_double_eval_merges_once() {
    let mut lora = LoRALinear::new("layer", base_linear(3, 4), &config(2, 2.0), 1);
    perturb_b(&mut lora);

    lora.train(false);
    let once = lora.base().weight().value().clone();
    lora.train(false);
    let twice = lora.base().weight().value().clone();

    assert_eq!(once, twice);
    assert!(lora.is_merged());
}

#[test]
fn test_double_train_is_noop() {
    let mut lora = LoRALinear::new("layer", base_linear(3, 4), &config(2, 2.0), 1);
    perturb_b(&mut lora);
    let original = lora.base().weight().value().clone();

    lora.train(true);
    lora.train(true);

    assert_eq!(lora.base().weight().value(), &original);
}

#[test]
fn test_rank_zero_is_passthrough() {
    let base = base_linear(3, 5);
    let x = input(4, 5);
    let expected = base.apply(&x).expect("base forward");

    let mut lora = LoRALinear::new("layer", base, &config(0, 8.0), 0);
    let out = lora.forward(&x).expect("forward");

    assert_eq!(out, expected);
    assert!(lora.lora_a().is_none());
    assert!(lora.lora_b().is_none());
    assert!(lora.params().iter().all(|p| !p.requires_grad()));

    lora.train(false);
    lora.train(true);
    assert_eq!(lora.forward(&x).expect("forward"), expected);
}

#[test]
fn test_backward_only_adapter_grads() {
    let mut lora = LoRALinear::new("layer", base_linear(3, 4), &config(2, 2.0), 5);
    perturb_b(&mut lora);
    let x = input(2, 4);
    lora.forward(&x).expect("forward");
    let grad_out = Array2::ones((2, 3));
    let grad_in = lora.backward(&grad_out).expect("backward");

    assert_eq!(grad_in.dim(), (2, 4));
    assert!(lora.base().weight().grad().iter().all(|&g| g == 0.0));
    assert!(lora.lora_a().is_some_and(|a| a.grad().iter().any(|&g| g != 0.0)));
    assert!(lora.lora_b().is_some_and(|b| b.grad().iter().any(|&g| g != 0.0)));
}

#[test]
fn test_backward_matches_finite_difference() {
    let mut lora = LoRALinear::new("layer", base_linear(2, 3), &config(1, 1.0), 11);
    perturb_b(&mut lora);
    let x = input(1, 3);

    // loss = sum(forward(x))
    lora.forward(&x).expect("forward");
    lora.backward(&Array2::ones((1, 2))).expect("backward");
    let analytic = lora.lora_a().map(|a| a.grad()[[0, 1]]).unwrap_or_default();

    let eps = 1e-3;
    let mut shifted = lora.clone();
    if let Some(a) = shifted.lora_a_mut() {
        a.value_mut()[[0, 1]] += eps;
    }
    let plus: f32 = shifted.forward(&x).expect("forward").sum();
    if let Some(a) = shifted.lora_a_mut() {
        a.value_mut()[[0, 1]] -= 2.0 * eps;
    }
    let minus: f32 = shifted.forward(&x).expect("forward").sum();
    let numeric = (plus - minus) / (2.0 * eps);

    assert_abs_diff_eq!(analytic, numeric, epsilon = 1e-2);
}

#[test]
fn test_backward_in_merged_state_fails() {
    let mut lora = LoRALinear::new("layer", base_linear(2, 2), &config(1, 1.0), 0);
    lora.train(false);
    lora.forward(&input(1, 2)).expect("forward");
    assert!(lora.backward(&Array2::ones((1, 2))).is_err());
}

#[test]
fn test_headed_layout() {
    let cfg = LoRAConfig { rank: 2, heads: 3, ..LoRAConfig::default() };
    let mut lora = LoRALinear::new("layer", base_linear(4, 5), &cfg, 0);
    perturb_b(&mut lora);

    let a = lora.lora_a_headed().expect("headed A");
    let b = lora.lora_b_headed().expect("headed B");
    assert_eq!(a.dim(), (3, 2, 5));
    assert_eq!(b.dim(), (4, 3, 2));

    // Sum of per-head products equals the flat product
    let delta = lora.delta_weight().expect("delta");
    for o in 0..4 {
        for i in 0..5 {
            let mut acc = 0.0;
            for h in 0..3 {
                for k in 0..2 {
                    acc += b[[o, h, k]] * a[[h, k, i]];
                }
            }
            assert_abs_diff_eq!(delta[[o, i]], acc * lora.scale(), epsilon = 1e-5);
        }
    }
}

#[test]
fn test_dropout_only_in_training() {
    let cfg = LoRAConfig { rank: 2, dropout: 0.5, ..LoRAConfig::default() };
    let mut lora = LoRALinear::new("layer", base_linear(3, 6), &cfg, 2);
    perturb_b(&mut lora);
    let x = input(8, 6);

    lora.train(false);
    let merged = lora.forward(&x).expect("forward");
    lora.train(true);
    let unmerged_a = lora.forward(&x).expect("forward");
    let unmerged_b = lora.forward(&x).expect("forward");

    // Different dropout masks give different training outputs
    assert_ne!(unmerged_a, unmerged_b);
    assert_eq!(merged.dim(), unmerged_a.dim());
}

#[test]
fn test_canonical_params_unmerged_in_eval() {
    let mut lora = LoRALinear::new("layer", base_linear(3, 3), &config(2, 2.0), 0);
    perturb_b(&mut lora);
    let original = lora.base().weight().value().clone();
    lora.train(false);

    let canonical = lora.canonical_params();
    let (_, weight, _) = &canonical[0];
    for (a, b) in weight.iter().zip(original.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-5);
    }
}
