use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;

use crate::error::{RankLossError, Result};
use crate::layers::loss_layer::{LossLayer, SCORE_A, SCORE_B};
use crate::math::blob::Blob;
use crate::network::scorer::LinearScorer;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::pair_dataset::PairDataset;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `scorer` on `data` through `layer` for `config.epochs` epochs and
/// returns the mean loss of the **last completed epoch**.
///
/// Each mini-batch is driven through the layer exactly as a host engine
/// would: setup → forward → backward(λ), after which the per-pair score
/// gradients are chained into the scorer's weights.
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// `InvalidConfig` if `data` is empty or `batch_size == 0`; any layer error
/// is propagated.
pub fn train_pairs(
    scorer: &mut LinearScorer,
    data: &PairDataset,
    layer: &mut dyn LossLayer,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<f64> {
    if data.is_empty() {
        return Err(RankLossError::InvalidConfig("pair dataset must not be empty".to_string()));
    }
    if config.batch_size == 0 {
        return Err(RankLossError::InvalidConfig("batch_size must be at least 1".to_string()));
    }

    let mut last_train_loss = 0.0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();
        let train_loss = run_one_epoch(scorer, data, layer, optimizer, config)?;
        last_train_loss = train_loss;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            pair_accuracy: pair_accuracy(scorer, data),
            elapsed_ms,
        };
        log::debug!("epoch {epoch}/{}: loss = {train_loss:.6}", config.epochs);

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                break;
            }
        }

        if stop_requested(config) {
            break;
        }
    }

    Ok(last_train_loss)
}

/// Fraction of pairs with distinct references whose score order matches the
/// reference order. Tied references are skipped.
pub fn pair_accuracy(scorer: &LinearScorer, data: &PairDataset) -> f64 {
    let mut ordered = 0usize;
    let mut correct = 0usize;
    for i in 0..data.len() {
        if data.left_ref[i] == data.right_ref[i] {
            continue;
        }
        ordered += 1;
        let left_higher = scorer.score(&data.left[i]) > scorer.score(&data.right[i]);
        if left_higher == (data.left_ref[i] > data.right_ref[i]) {
            correct += 1;
        }
    }
    if ordered == 0 {
        return 0.0;
    }
    correct as f64 / ordered as f64
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

/// One shuffled pass of mini-batch SGD. Returns the mean loss over all pairs.
fn run_one_epoch(
    scorer: &mut LinearScorer,
    data: &PairDataset,
    layer: &mut dyn LossLayer,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<f64> {
    let n = data.len();
    let mut total_loss = 0.0;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rand::thread_rng());

    for batch in indices.chunks(config.batch_size) {
        let mut bottom = vec![
            Blob::from_scores(batch.iter().map(|&i| scorer.score(&data.left[i])).collect()),
            Blob::from_scores(batch.iter().map(|&i| scorer.score(&data.right[i])).collect()),
            Blob::from_scores(batch.iter().map(|&i| data.left_ref[i]).collect()),
            Blob::from_scores(batch.iter().map(|&i| data.right_ref[i]).collect()),
        ];

        layer.setup(&bottom)?;
        let loss = layer.forward(&bottom)?;
        total_loss += loss * batch.len() as f64;
        layer.backward(config.loss_weight, &[true, true], &mut bottom)?;

        // ∂E/∂w = Σ_j gA_j·x_left_j + gB_j·x_right_j, ∂E/∂b = Σ_j gA_j + gB_j
        let mut weights_grad = vec![0.0; scorer.input_size()];
        let mut bias_grad = 0.0;
        for (j, &i) in batch.iter().enumerate() {
            let grad_a = bottom[SCORE_A].diff[j];
            let grad_b = bottom[SCORE_B].diff[j];
            for (k, g) in weights_grad.iter_mut().enumerate() {
                *g += grad_a * data.left[i][k] + grad_b * data.right[i][k];
            }
            bias_grad += grad_a + grad_b;
        }

        optimizer.step(scorer, &weights_grad, bias_grad);
    }

    Ok(total_loss / n as f64)
}
