pub mod scorer;

pub use scorer::LinearScorer;
