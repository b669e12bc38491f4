use thiserror::Error;

/// Errors raised by the ranking loss layers and their configuration layer.
///
/// Numerical problems (NaN / Inf in scores or references) are deliberately
/// absent: they propagate through the arithmetic untouched.
#[derive(Error, Debug)]
pub enum RankLossError {
    /// An input's per-example width is not 1, or batch sizes disagree.
    #[error("shape mismatch on input {input}: expected {expected}, got {got}")]
    ShapeMismatch {
        input: usize,
        expected: String,
        got: String,
    },

    #[error("expected exactly {expected} inputs, got {got}")]
    InputCount { expected: usize, got: usize },

    #[error("{layer}: backward called before forward on the current batch")]
    BackwardBeforeForward { layer: &'static str },

    #[error("unknown loss layer type '{0}'")]
    UnknownLayerType(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RankLossError>;
