pub mod epoch_stats;
pub mod loop_fn;
pub mod pair_dataset;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use loop_fn::{pair_accuracy, train_pairs};
pub use pair_dataset::PairDataset;
pub use train_config::TrainConfig;
