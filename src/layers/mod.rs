pub mod loss_layer;
pub mod pair_buffers;

pub use loss_layer::{LossLayer, PAIR_INPUTS, SCORE_A, SCORE_B, REF_A, REF_B};
pub use pair_buffers::{PairBuffers, validate_pair_inputs, hinge, mean_hinge, wants_gradient};
