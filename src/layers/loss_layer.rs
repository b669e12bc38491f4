use crate::error::Result;
use crate::math::blob::Blob;

/// Number of inputs every pairwise ranking layer consumes:
/// `[score_a, score_b, ref_a, ref_b]`.
pub const PAIR_INPUTS: usize = 4;

/// Index of the first score input.
pub const SCORE_A: usize = 0;
/// Index of the second score input.
pub const SCORE_B: usize = 1;
/// Index of the first ground-truth reference input.
pub const REF_A: usize = 2;
/// Index of the second ground-truth reference input.
pub const REF_B: usize = 3;

/// The interface a host execution engine drives a loss layer through.
///
/// Call sequence per batch: `setup` (whenever shapes may have changed),
/// `forward`, then optionally `backward`. `backward` reads the state cached by
/// the immediately preceding `forward`; the engine must not interleave calls
/// on one instance from several threads.
pub trait LossLayer: Send {
    /// Validates input shapes and sizes the cached buffers for batch size N.
    fn setup(&mut self, bottom: &[Blob]) -> Result<()>;

    /// Computes the scalar loss and caches Difference / SignedDistance.
    fn forward(&mut self, bottom: &[Blob]) -> Result<f64>;

    /// Writes ∂E/∂score into `bottom[k].diff` for each `k ∈ {0, 1}` with
    /// `propagate_down[k]` set. `top_diff` is the loss weight λ.
    fn backward(&mut self, top_diff: f64, propagate_down: &[bool], bottom: &mut [Blob]) -> Result<()>;

    /// Registration key, e.g. `"RankingLoss"`.
    fn type_name(&self) -> &'static str;

    fn margin(&self) -> f64;

    /// Cached `score_a - score_b` from the last forward.
    fn difference(&self) -> &[f64];

    /// Cached per-example signed distance from the last forward.
    fn signed_distance(&self) -> &[f64];

    fn exact_num_inputs(&self) -> usize {
        PAIR_INPUTS
    }

    /// Only the two score inputs are differentiable; the references are
    /// ordering selectors.
    fn allow_force_backward(&self, index: usize) -> bool {
        index == SCORE_A || index == SCORE_B
    }
}
