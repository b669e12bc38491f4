use crate::network::scorer::LinearScorer;

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one SGD update to a scorer given its pre-computed gradients.
    pub fn step(&self, scorer: &mut LinearScorer, weights_grad: &[f64], bias_grad: f64) {
        scorer.apply_gradients(weights_grad, bias_grad, self.learning_rate);
    }
}
