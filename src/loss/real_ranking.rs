use crate::backend::Backend;
use crate::error::Result;
use crate::layers::loss_layer::{LossLayer, REF_A, REF_B, SCORE_A, SCORE_B};
use crate::layers::pair_buffers::{mean_hinge, validate_pair_inputs, wants_gradient, PairBuffers};
use crate::loss::spec::RankingLossParam;
use crate::math::blob::Blob;
use crate::math::vector;

/// Scale applied to the reference difference before thresholding.
pub const RESCALE: f64 = 0.0125;

/// Pairwise hinge ranking loss driven by a real-valued reference difference.
///
///   r_i = RESCALE · (ref_a_i − ref_b_i)
///   d_i = +(a_i − b_i)  if reference_signal(r_i)
///         −(a_i − b_i)  otherwise
///   E   = (1/N) · Σ max(margin − d_i, 0)
///
/// Every pair contributes a direction; there is no margin band. Forward and
/// backward share the same cached `r_i`.
#[derive(Debug, Clone)]
pub struct RealRankingLoss {
    margin: f64,
    backend: Backend,
    buffers: PairBuffers,
    reference_difference: Vec<f64>,
    rescaled: Vec<f64>,
}

impl RealRankingLoss {
    pub const TYPE_NAME: &'static str = "RealRankingLoss";

    pub fn new(param: RankingLossParam) -> Result<RealRankingLoss> {
        param.validate()?;
        log::debug!("{}: margin = {}, backend = {:?}", Self::TYPE_NAME, param.margin, param.backend);
        Ok(RealRankingLoss {
            margin: param.margin,
            backend: param.backend,
            buffers: PairBuffers::new(),
            reference_difference: Vec::new(),
            rescaled: Vec::new(),
        })
    }

    /// Cached `RESCALE · (ref_a − ref_b)` from the last forward.
    pub fn rescaled(&self) -> &[f64] {
        &self.rescaled
    }
}

/// Integer-truncation threshold on a rescaled reference difference.
///
/// True ("A ranks above B") when truncating `rescaled` toward zero gives a
/// nonzero integer, i.e. |rescaled| ≥ 1. This holds for large negative
/// differences too. Anything smaller, NaN included, falls to the
/// "B ranks above A" branch.
pub fn reference_signal(rescaled: f64) -> bool {
    rescaled.abs() >= 1.0
}

/// ∂E/∂score for input `index` at one example. `alpha_scale` is λ/N.
pub fn score_gradient(index: usize, signed_distance: f64, rescaled: f64, margin: f64, alpha_scale: f64) -> f64 {
    if !(margin - signed_distance > 0.0) {
        return 0.0;
    }
    let sign = if index == SCORE_A { 1.0 } else { -1.0 };
    let alpha = sign * alpha_scale;
    if reference_signal(rescaled) { -alpha } else { alpha }
}

impl LossLayer for RealRankingLoss {
    fn setup(&mut self, bottom: &[Blob]) -> Result<()> {
        let num = validate_pair_inputs(bottom)?;
        self.buffers.reshape(num, Self::TYPE_NAME);
        if self.rescaled.len() != num {
            self.reference_difference = vec![0.0; num];
            self.rescaled = vec![0.0; num];
        }
        Ok(())
    }

    fn forward(&mut self, bottom: &[Blob]) -> Result<f64> {
        self.buffers.check_batch(bottom)?;
        let margin = self.margin;

        self.backend.sub(&bottom[SCORE_A].data, &bottom[SCORE_B].data, &mut self.buffers.difference);
        self.backend.sub(&bottom[REF_A].data, &bottom[REF_B].data, &mut self.reference_difference);
        vector::axpby(RESCALE, &self.reference_difference, 0.0, &mut self.rescaled);

        let difference = &self.buffers.difference;
        let rescaled = &self.rescaled;
        self.backend.fill_indexed(&mut self.buffers.signed_distance, |i| {
            if reference_signal(rescaled[i]) { difference[i] } else { -difference[i] }
        });
        self.buffers.mark_forwarded();

        let loss = mean_hinge(self.backend, &self.buffers.signed_distance, margin, Self::TYPE_NAME);
        log::trace!("{}: loss = {loss}", Self::TYPE_NAME);
        Ok(loss)
    }

    fn backward(&mut self, top_diff: f64, propagate_down: &[bool], bottom: &mut [Blob]) -> Result<()> {
        self.buffers.ensure_forwarded(Self::TYPE_NAME)?;
        self.buffers.check_batch(bottom)?;
        let num = self.buffers.num();
        if num == 0 {
            return Ok(());
        }
        let margin = self.margin;
        let alpha_scale = top_diff / num as f64;
        let dist = &self.buffers.signed_distance;
        let rescaled = &self.rescaled;

        for index in [SCORE_A, SCORE_B] {
            if !wants_gradient(propagate_down, index) {
                continue;
            }
            self.backend.fill_indexed(&mut bottom[index].diff, |i| {
                score_gradient(index, dist[i], rescaled[i], margin, alpha_scale)
            });
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn margin(&self) -> f64 {
        self.margin
    }

    fn difference(&self) -> &[f64] {
        &self.buffers.difference
    }

    fn signed_distance(&self) -> &[f64] {
        &self.buffers.signed_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn layer(margin: f64) -> RealRankingLoss {
        RealRankingLoss::new(RankingLossParam::new(margin)).unwrap()
    }

    fn batch(a: &[f64], b: &[f64], ra: &[f64], rb: &[f64]) -> Vec<Blob> {
        [a, b, ra, rb].iter().map(|v| Blob::from_scores(v.to_vec())).collect()
    }

    #[test]
    fn truncation_threshold_boundary() {
        // 0.0125 · 79.92 = 0.999, 0.0125 · 80.08 = 1.001
        assert!(!reference_signal(RESCALE * 79.92));
        assert!(reference_signal(RESCALE * 80.08));
        assert!(reference_signal(RESCALE * -80.08));
        assert!(!reference_signal(RESCALE * -79.92));
        assert!(!reference_signal(f64::NAN));
    }

    #[test]
    fn boundary_flips_signed_distance() {
        let mut l = layer(0.3);
        let bottom = batch(&[2.0, 2.0], &[1.0, 1.0], &[79.92, 80.08], &[0.0, 0.0]);
        l.setup(&bottom).unwrap();
        l.forward(&bottom).unwrap();
        assert_eq!(l.signed_distance(), &[-1.0, 1.0]);
        assert_abs_diff_eq!(l.rescaled()[0], 0.999, epsilon = 1e-12);
        assert_abs_diff_eq!(l.rescaled()[1], 1.001, epsilon = 1e-12);
    }

    #[test]
    fn small_positive_difference_defaults_to_b_above_a() {
        let mut l = layer(0.3);
        let bottom = batch(&[1.0], &[0.0], &[10.0], &[0.0]);
        l.setup(&bottom).unwrap();
        // d = −1, penalty = 1.3
        assert_abs_diff_eq!(l.forward(&bottom).unwrap(), 1.3, epsilon = 1e-12);
    }

    #[test]
    fn gradients_are_antisymmetric_when_active() {
        let mut l = layer(0.5);
        let mut bottom = batch(&[0.0, 1.0, 0.2], &[0.1, 0.0, 0.0], &[100.0, 0.0, 0.0], &[0.0, 0.0, 120.0]);
        l.setup(&bottom).unwrap();
        l.forward(&bottom).unwrap();
        l.backward(1.0, &[true, true], &mut bottom).unwrap();
        // Example 0: signal set, d = −0.1, active → ∂E/∂a = −1/3.
        assert_abs_diff_eq!(bottom[0].diff[0], -1.0 / 3.0, epsilon = 1e-12);
        // Example 1: no signal, d = −1, active → ∂E/∂a = +1/3.
        assert_abs_diff_eq!(bottom[0].diff[1], 1.0 / 3.0, epsilon = 1e-12);
        for i in 0..3 {
            assert_abs_diff_eq!(bottom[0].diff[i], -bottom[1].diff[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn satisfied_margin_has_zero_gradient() {
        let mut l = layer(0.3);
        let mut bottom = batch(&[2.0], &[0.0], &[100.0], &[0.0]);
        l.setup(&bottom).unwrap();
        assert_eq!(l.forward(&bottom).unwrap(), 0.0);
        l.backward(1.0, &[true, true], &mut bottom).unwrap();
        assert_eq!(bottom[0].diff[0], 0.0);
        assert_eq!(bottom[1].diff[0], 0.0);
    }

    #[test]
    fn setup_resizes_rescaled_cache() {
        let mut l = layer(0.3);
        let small = batch(&[0.0], &[0.0], &[0.0], &[0.0]);
        l.setup(&small).unwrap();
        l.forward(&small).unwrap();
        let big = batch(&[0.0; 3], &[0.0; 3], &[90.0; 3], &[0.0; 3]);
        l.setup(&big).unwrap();
        assert_eq!(l.rescaled(), &[0.0; 3]);
        assert_eq!(l.signed_distance(), &[0.0; 3]);
    }
}
