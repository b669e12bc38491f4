use crate::backend::Backend;
use crate::error::Result;
use crate::layers::loss_layer::{LossLayer, REF_A, REF_B, SCORE_A, SCORE_B};
use crate::layers::pair_buffers::{mean_hinge, validate_pair_inputs, wants_gradient, PairBuffers};
use crate::loss::spec::RankingLossParam;
use crate::math::blob::Blob;

/// Pairwise hinge ranking loss with a categorical ground-truth comparison.
///
///   d_i = +(a_i − b_i)  if ref_a_i > ref_b_i + margin
///         −(a_i − b_i)  if ref_a_i < ref_b_i − margin
///         0             otherwise (references too close to rank)
///   E   = (1/N) · Σ max(margin − d_i, 0)
///
/// Pairs inside the margin band still pay `margin` in the forward loss but
/// receive no gradient.
#[derive(Debug, Clone)]
pub struct RankingLoss {
    margin: f64,
    backend: Backend,
    buffers: PairBuffers,
}

impl RankingLoss {
    pub const TYPE_NAME: &'static str = "RankingLoss";

    pub fn new(param: RankingLossParam) -> Result<RankingLoss> {
        param.validate()?;
        log::debug!("{}: margin = {}, backend = {:?}", Self::TYPE_NAME, param.margin, param.backend);
        Ok(RankingLoss {
            margin: param.margin,
            backend: param.backend,
            buffers: PairBuffers::new(),
        })
    }
}

/// Forward classifier: margin-aware comparison of the two references.
pub fn signed_distance(difference: f64, ref_a: f64, ref_b: f64, margin: f64) -> f64 {
    if ref_a > ref_b + margin {
        difference
    } else if ref_a < ref_b - margin {
        -difference
    } else {
        0.0
    }
}

/// Gradient written to input `index` at one example.
///
/// α = sign·λ/N where `sign` comes from a strict `ref_a > ref_b` test that
/// ignores the margin. The branch comes from the margin-aware test used in
/// forward: GradA = −α when A ranks above B, +α when B ranks above A, and 0
/// inside the margin band. GradB is always −GradA. `alpha_scale` is λ/N.
///
/// With margin ≥ 0 both ranked branches therefore give GradA = −λ/N. In the
/// "B above A" branch that is not the derivative of the forward loss.
pub fn score_gradient(
    index: usize,
    signed_distance: f64,
    ref_a: f64,
    ref_b: f64,
    margin: f64,
    alpha_scale: f64,
) -> f64 {
    if !(margin - signed_distance > 0.0) {
        return 0.0;
    }
    let sign = if ref_a > ref_b { 1.0 } else { -1.0 };
    let alpha = sign * alpha_scale;
    let grad_a = if ref_a > ref_b + margin {
        -alpha
    } else if ref_a < ref_b - margin {
        alpha
    } else {
        0.0
    };
    if index == SCORE_A { grad_a } else { -grad_a }
}

impl LossLayer for RankingLoss {
    fn setup(&mut self, bottom: &[Blob]) -> Result<()> {
        let num = validate_pair_inputs(bottom)?;
        self.buffers.reshape(num, Self::TYPE_NAME);
        Ok(())
    }

    fn forward(&mut self, bottom: &[Blob]) -> Result<f64> {
        self.buffers.check_batch(bottom)?;
        let margin = self.margin;
        let (ref_a, ref_b) = (&bottom[REF_A].data, &bottom[REF_B].data);

        self.backend.sub(&bottom[SCORE_A].data, &bottom[SCORE_B].data, &mut self.buffers.difference);
        let difference = &self.buffers.difference;
        self.backend.fill_indexed(&mut self.buffers.signed_distance, |i| {
            signed_distance(difference[i], ref_a[i], ref_b[i], margin)
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
        let (scores, refs) = bottom.split_at_mut(REF_A);
        let (ref_a, ref_b) = (&refs[0].data, &refs[1].data);
        let dist = &self.buffers.signed_distance;

        for index in [SCORE_A, SCORE_B] {
            if !wants_gradient(propagate_down, index) {
                continue;
            }
            self.backend.fill_indexed(&mut scores[index].diff, |i| {
                score_gradient(index, dist[i], ref_a[i], ref_b[i], margin, alpha_scale)
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
