use serde::{Serialize, Deserialize};

use crate::backend::Backend;
use crate::error::{RankLossError, Result};
use crate::layers::loss_layer::LossLayer;
use crate::loss::loss_type::LossType;

fn default_margin() -> f64 {
    1.0
}

/// Construction-time parameters shared by both ranking layers.
///
/// `margin` is fixed for the life of the layer. Missing fields fall back to
/// margin 1.0 on the `Cpu` backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingLossParam {
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default)]
    pub backend: Backend,
}

impl RankingLossParam {
    pub fn new(margin: f64) -> RankingLossParam {
        RankingLossParam { margin, backend: Backend::Cpu }
    }

    pub fn with_backend(mut self, backend: Backend) -> RankingLossParam {
        self.backend = backend;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() {
            return Err(RankLossError::InvalidConfig(format!(
                "margin must be finite, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}

impl Default for RankingLossParam {
    fn default() -> Self {
        RankingLossParam::new(default_margin())
    }
}

/// A serializable description of one ranking loss layer.
///
/// ```json
/// { "name": "rank", "type": "RealRankingLoss", "param": { "margin": 0.3 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossLayerSpec {
    /// Human-readable layer name.
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: LossType,
    #[serde(default)]
    pub param: RankingLossParam,
}

impl LossLayerSpec {
    pub fn new(name: impl Into<String>, layer_type: LossType, param: RankingLossParam) -> LossLayerSpec {
        LossLayerSpec { name: name.into(), layer_type, param }
    }

    /// Instantiates the described layer.
    pub fn build(&self) -> Result<Box<dyn LossLayer>> {
        log::debug!("building loss layer '{}' of type {}", self.name, self.layer_type.type_name());
        self.layer_type.build(self.param)
    }

    pub fn from_json_str(json: &str) -> Result<LossLayerSpec> {
        let spec: LossLayerSpec = serde_json::from_str(json)?;
        spec.param.validate()?;
        Ok(spec)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `LossLayerSpec` from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> Result<LossLayerSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: LossLayerSpec = serde_json::from_reader(reader)?;
        spec.param.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_param_uses_defaults() {
        let spec = LossLayerSpec::from_json_str(r#"{ "name": "rank", "type": "RankingLoss" }"#).unwrap();
        assert_eq!(spec.layer_type, LossType::RankingLoss);
        assert_eq!(spec.param.margin, 1.0);
        assert_eq!(spec.param.backend, Backend::Cpu);
    }

    #[test]
    fn parses_full_spec() {
        let json = r#"{ "name": "r", "type": "RealRankingLoss",
                        "param": { "margin": 0.3, "backend": "parallel" } }"#;
        let spec = LossLayerSpec::from_json_str(json).unwrap();
        assert_eq!(spec.layer_type, LossType::RealRankingLoss);
        assert_eq!(spec.param, RankingLossParam::new(0.3).with_backend(Backend::Parallel));
        let layer = spec.build().unwrap();
        assert_eq!(layer.type_name(), "RealRankingLoss");
        assert_eq!(layer.margin(), 0.3);
    }

    #[test]
    fn unknown_type_is_a_json_error() {
        let err = LossLayerSpec::from_json_str(r#"{ "name": "x", "type": "Contrastive" }"#).unwrap_err();
        assert!(matches!(err, RankLossError::Json(_)));
    }

    #[test]
    fn non_finite_margin_is_rejected() {
        assert!(matches!(
            RankingLossParam::new(f64::INFINITY).validate(),
            Err(RankLossError::InvalidConfig(_))
        ));
    }
}
