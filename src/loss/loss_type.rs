use serde::{Serialize, Deserialize};

use crate::error::{RankLossError, Result};
use crate::layers::loss_layer::LossLayer;
use crate::loss::ranking::RankingLoss;
use crate::loss::real_ranking::RealRankingLoss;
use crate::loss::spec::RankingLossParam;

/// Selects which pairwise ranking layer to build.
///
/// - `RankingLoss`     — categorical reference comparison with a margin band.
/// - `RealRankingLoss` — continuous reference difference, thresholded after
///   rescaling; no band.
///
/// Serialized under the layer's registration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossType {
    RankingLoss,
    RealRankingLoss,
}

impl LossType {
    pub const ALL: [LossType; 2] = [LossType::RankingLoss, LossType::RealRankingLoss];

    pub fn type_name(self) -> &'static str {
        match self {
            LossType::RankingLoss => RankingLoss::TYPE_NAME,
            LossType::RealRankingLoss => RealRankingLoss::TYPE_NAME,
        }
    }

    pub fn from_type_name(name: &str) -> Result<LossType> {
        LossType::ALL
            .into_iter()
            .find(|t| t.type_name() == name)
            .ok_or_else(|| RankLossError::UnknownLayerType(name.to_string()))
    }

    pub fn build(self, param: RankingLossParam) -> Result<Box<dyn LossLayer>> {
        Ok(match self {
            LossType::RankingLoss => Box::new(RankingLoss::new(param)?),
            LossType::RealRankingLoss => Box::new(RealRankingLoss::new(param)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_round_trip() {
        for t in LossType::ALL {
            assert_eq!(LossType::from_type_name(t.type_name()).unwrap(), t);
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.type_name()));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            LossType::from_type_name("ContrastiveLoss"),
            Err(RankLossError::UnknownLayerType(name)) if name == "ContrastiveLoss"
        ));
    }

    #[test]
    fn build_dispatches_on_type() {
        let layer = LossType::RankingLoss.build(RankingLossParam::new(0.3)).unwrap();
        assert_eq!(layer.type_name(), "RankingLoss");
        assert_eq!(layer.exact_num_inputs(), 4);
    }
}
