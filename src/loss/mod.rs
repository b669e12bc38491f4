pub mod loss_type;
pub mod ranking;
pub mod real_ranking;
pub mod spec;

pub use loss_type::LossType;
pub use ranking::RankingLoss;
pub use real_ranking::RealRankingLoss;
pub use spec::{LossLayerSpec, RankingLossParam};
