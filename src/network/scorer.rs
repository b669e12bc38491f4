use rand::prelude::*;
use serde::{Serialize, Deserialize};

use crate::error::Result;

/// A linear scoring head: score(x) = w·x + b.
///
/// Both branches of a siamese pair share one scorer; the ranking loss only
/// sees the two scores it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScorer {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearScorer {
    pub fn zeros(input_size: usize) -> LinearScorer {
        LinearScorer { weights: vec![0.0; input_size], bias: 0.0 }
    }

    /// Uniform init in [-1, 1).
    pub fn random(input_size: usize) -> LinearScorer {
        let mut rng = rand::thread_rng();
        LinearScorer {
            weights: (0..input_size).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect(),
            bias: rng.gen::<f64>() * 2.0 - 1.0,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.len()
    }

    pub fn score(&self, input: &[f64]) -> f64 {
        assert_eq!(input.len(), self.weights.len(), "input width must match scorer width");
        self.weights.iter().zip(input.iter()).map(|(w, x)| w * x).sum::<f64>() + self.bias
    }

    /// Applies pre-computed gradients scaled by lr.
    pub fn apply_gradients(&mut self, weights_grad: &[f64], bias_grad: f64, lr: f64) {
        for (w, g) in self.weights.iter_mut().zip(weights_grad.iter()) {
            *w -= lr * g;
        }
        self.bias -= lr * bias_grad;
    }

    /// Serializes the scorer to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a scorer from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<LinearScorer> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_affine() {
        let s = LinearScorer { weights: vec![2.0, -1.0], bias: 0.5 };
        assert_eq!(s.score(&[1.0, 3.0]), -0.5);
    }

    #[test]
    fn random_init_is_bounded() {
        let s = LinearScorer::random(64);
        assert!(s.weights.iter().all(|w| (-1.0..1.0).contains(w)));
    }

    #[test]
    fn gradient_step_moves_against_gradient() {
        let mut s = LinearScorer::zeros(2);
        s.apply_gradients(&[1.0, -2.0], 0.5, 0.1);
        assert_eq!(s.weights, vec![-0.1, 0.2]);
        assert_eq!(s.bias, -0.05);
    }
}
