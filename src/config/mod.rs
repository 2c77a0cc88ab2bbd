//! Engine configuration: the occluding body and link parameters.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::occlusion::{
    OcclusionError, OcclusionModel, ATMOSPHERE_MARGIN_KM, EARTH_RADIUS_KM,
};
use crate::geometry::Vector3;
use crate::link::{LinkConfig, DEFAULT_FREQUENCY_MHZ};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "CROSSLINK_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid occluding body: {0}")]
    Model(#[from] OcclusionError),
    #[error("link frequency must be a positive number of MHz (got {0})")]
    InvalidFrequency(f64),
    #[error("maximum link range must be a positive number of km (got {0})")]
    InvalidRange(f64),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub radius_km: f64,
    pub margin_km: f64,
    pub center_km: [f64; 3],
}

impl Default for BodyConfig {
    fn default() -> Self {
        BodyConfig {
            radius_km: EARTH_RADIUS_KM,
            margin_km: ATMOSPHERE_MARGIN_KM,
            center_km: [0.0; 3],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkSettings {
    pub frequency_mhz: f64,
    pub max_range_km: Option<f64>,
}

impl Default for LinkSettings {
    fn default() -> Self {
        LinkSettings {
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
            max_range_km: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub body: BodyConfig,
    pub link: LinkSettings,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!("loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by `CROSSLINK_CONFIG`, or the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_json_file(path),
            None => {
                info!("{} not set, using default Earth configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.occlusion_model()?;
        let f = self.link.frequency_mhz;
        if !(f.is_finite() && f > 0.0) {
            return Err(ConfigError::InvalidFrequency(f));
        }
        if let Some(range) = self.link.max_range_km {
            if !(range.is_finite() && range > 0.0) {
                return Err(ConfigError::InvalidRange(range));
            }
        }
        Ok(())
    }

    pub fn occlusion_model(&self) -> Result<OcclusionModel, ConfigError> {
        let model = OcclusionModel::new(self.body.radius_km, self.body.margin_km)?
            .with_center(Vector3::from(self.body.center_km))?;
        Ok(model)
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            frequency_mhz: self.link.frequency_mhz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_earth_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.occlusion_model().unwrap(), OcclusionModel::earth());
        assert_eq!(config.link_config(), LinkConfig::default());
    }

    #[test]
    fn partial_body_override() {
        let config = EngineConfig::from_json_str(
            r#"{ "body": { "margin_km": 100.0 }, "link": { "max_range_km": 5000.0 } }"#,
        )
        .unwrap();
        let model = config.occlusion_model().unwrap();
        assert_eq!(model.body_radius(), EARTH_RADIUS_KM);
        assert_eq!(model.margin(), 100.0);
        assert_eq!(config.link.max_range_km, Some(5000.0));
    }

    #[test]
    fn negative_margin_is_a_config_error() {
        let err = EngineConfig::from_json_str(r#"{ "body": { "margin_km": -20.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Model(OcclusionError::NegativeMargin(_))
        ));
    }

    #[test]
    fn bad_link_settings() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "link": { "frequency_mhz": 0.0 } }"#),
            Err(ConfigError::InvalidFrequency(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "link": { "max_range_km": -1.0 } }"#),
            Err(ConfigError::InvalidRange(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "body": { "radius_km": 1737.4, "margin_km": 0.0 } }"#).unwrap();
        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.occlusion_model().unwrap().effective_radius(), 1737.4);
        assert!(matches!(
            EngineConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
