use serde::{Serialize, Deserialize};

/// Per-epoch statistics emitted by `train_pairs` over the optional
/// `progress_tx` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean ranking loss over all pairs in this epoch.
    pub train_loss: f64,
    /// Fraction of strictly ordered pairs the scorer ranks correctly, in [0, 1].
    pub pair_accuracy: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
