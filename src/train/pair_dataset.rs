use crate::error::{RankLossError, Result};

/// Feature vectors for both sides of every pair plus the ground-truth
/// reference values that decide which side should score higher.
#[derive(Debug, Clone)]
pub struct PairDataset {
    pub left: Vec<Vec<f64>>,
    pub right: Vec<Vec<f64>>,
    pub left_ref: Vec<f64>,
    pub right_ref: Vec<f64>,
}

impl PairDataset {
    pub fn new(
        left: Vec<Vec<f64>>,
        right: Vec<Vec<f64>>,
        left_ref: Vec<f64>,
        right_ref: Vec<f64>,
    ) -> Result<PairDataset> {
        let n = left.len();
        for (input, len) in [right.len(), left_ref.len(), right_ref.len()].into_iter().enumerate() {
            if len != n {
                return Err(RankLossError::ShapeMismatch {
                    input: input + 1,
                    expected: format!("{n} pairs"),
                    got: format!("{len} pairs"),
                });
            }
        }
        Ok(PairDataset { left, right, left_ref, right_ref })
    }

    /// Swaps sides where needed so every pair has `left_ref >= right_ref`.
    ///
    /// RealRankingLoss reads any reference gap of magnitude ≥ 80 as "left
    /// above right" regardless of its sign, so its inputs must be oriented.
    pub fn oriented(mut self) -> PairDataset {
        for i in 0..self.len() {
            if self.left_ref[i] < self.right_ref[i] {
                std::mem::swap(&mut self.left[i], &mut self.right[i]);
                std::mem::swap(&mut self.left_ref[i], &mut self.right_ref[i]);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}
