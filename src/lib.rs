pub mod error;
pub mod math;
pub mod backend;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{RankLossError, Result};
pub use math::blob::Blob;
pub use backend::Backend;
pub use layers::loss_layer::LossLayer;
pub use loss::{LossType, LossLayerSpec, RankingLoss, RankingLossParam, RealRankingLoss};
pub use network::scorer::LinearScorer;
pub use optim::sgd::Sgd;
pub use train::{train_pairs, PairDataset, TrainConfig};
