use crate::backend::Backend;
use crate::error::{RankLossError, Result};
use crate::layers::loss_layer::PAIR_INPUTS;
use crate::math::blob::Blob;

/// Checks the four pair inputs and returns the shared batch size N.
///
/// Every input must carry exactly one value per example and all four must
/// agree on N.
pub fn validate_pair_inputs(bottom: &[Blob]) -> Result<usize> {
    if bottom.len() != PAIR_INPUTS {
        return Err(RankLossError::InputCount { expected: PAIR_INPUTS, got: bottom.len() });
    }
    for (input, blob) in bottom.iter().enumerate() {
        if blob.per_example() != 1 {
            return Err(RankLossError::ShapeMismatch {
                input,
                expected: "per-example width 1 (N x 1 x 1 x 1)".to_string(),
                got: format!("{:?}", blob.shape()),
            });
        }
    }
    let num = bottom[0].num;
    for (input, blob) in bottom.iter().enumerate().skip(1) {
        if blob.num != num {
            return Err(RankLossError::ShapeMismatch {
                input,
                expected: format!("batch size {num}"),
                got: format!("batch size {}", blob.num),
            });
        }
    }
    Ok(num)
}

/// State shared by both ranking layers and cached between forward and
/// backward: the score difference and the signed distance per example.
#[derive(Debug, Clone, Default)]
pub struct PairBuffers {
    pub difference: Vec<f64>,
    pub signed_distance: Vec<f64>,
    num: usize,
    forwarded: bool,
}

impl PairBuffers {
    pub fn new() -> PairBuffers {
        PairBuffers::default()
    }

    pub fn num(&self) -> usize {
        self.num
    }

    /// Resizes and zeroes the cache when N changes. A reshape invalidates the
    /// previous forward.
    pub fn reshape(&mut self, num: usize, layer: &'static str) {
        if num == self.num && self.difference.len() == num {
            return;
        }
        log::debug!("{layer}: reshaping cached buffers {} -> {num}", self.num);
        self.num = num;
        self.difference = vec![0.0; num];
        self.signed_distance = vec![0.0; num];
        self.forwarded = false;
    }

    /// Rejects a batch that no longer matches the set-up N, so a stale cache
    /// is never paired with new inputs.
    pub fn check_batch(&self, bottom: &[Blob]) -> Result<()> {
        if bottom.len() != PAIR_INPUTS {
            return Err(RankLossError::InputCount { expected: PAIR_INPUTS, got: bottom.len() });
        }
        for (input, blob) in bottom.iter().enumerate() {
            let count = blob.count();
            if blob.data.len() != count || blob.diff.len() != count {
                return Err(RankLossError::ShapeMismatch {
                    input,
                    expected: format!("{count} values for shape {:?}", blob.shape()),
                    got: format!("{} data / {} diff values", blob.data.len(), blob.diff.len()),
                });
            }
            if count != self.num {
                return Err(RankLossError::ShapeMismatch {
                    input,
                    expected: format!("{} values (call setup after a batch-size change)", self.num),
                    got: format!("{count} values"),
                });
            }
        }
        Ok(())
    }

    pub fn mark_forwarded(&mut self) {
        self.forwarded = true;
    }

    pub fn ensure_forwarded(&self, layer: &'static str) -> Result<()> {
        if self.forwarded {
            Ok(())
        } else {
            Err(RankLossError::BackwardBeforeForward { layer })
        }
    }
}

/// max(x, 0) that lets NaN through (`f64::max` would swallow it).
pub fn hinge(x: f64) -> f64 {
    if x < 0.0 { 0.0 } else { x }
}

/// Mean hinge penalty: (1/N)·Σ max(margin − signed_distance[i], 0).
///
/// An empty batch yields 0 rather than 0/0.
pub fn mean_hinge(backend: Backend, signed_distance: &[f64], margin: f64, layer: &'static str) -> f64 {
    let n = signed_distance.len();
    if n == 0 {
        log::warn!("{layer}: forward on an empty batch, loss is 0");
        return 0.0;
    }
    backend.sum_by(signed_distance, |d| hinge(margin - d)) / n as f64
}

/// Whether the engine asked for the gradient of input `index`.
pub fn wants_gradient(propagate_down: &[bool], index: usize) -> bool {
    propagate_down.get(index).copied().unwrap_or(false)
}
