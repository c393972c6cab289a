//! Configuration management for clustering runs

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cluster::quality::{CohesivenessFunction, DensityFunction, QualityFunction};
use crate::error::{EngineError, Result};

/// Which quality function scores clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityKind {
    #[default]
    Cohesiveness,
    Density,
}

impl QualityKind {
    /// Instantiate the quality function; `penalty` only affects cohesiveness
    pub fn build(&self, penalty: f64) -> Arc<dyn QualityFunction> {
        match self {
            QualityKind::Cohesiveness => Arc::new(CohesivenessFunction::new(penalty)),
            QualityKind::Density => Arc::new(DensityFunction),
        }
    }
}

impl std::str::FromStr for QualityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cohesiveness" => Ok(QualityKind::Cohesiveness),
            "density" => Ok(QualityKind::Density),
            other => Err(format!("unknown quality function '{}'", other)),
        }
    }
}

/// Parameters handed to the clustering algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum cluster size
    pub min_size: usize,

    /// Minimum weighted density a cluster must reach
    pub min_density: f64,

    /// Expected weight of unobserved boundary edges
    pub penalty: f64,

    /// Quality function used for growing and scoring
    pub quality: QualityKind,

    /// Limit on the number of seeds tried; all nodes when unset
    pub max_seeds: Option<usize>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_size: 3,
            min_density: 0.3,
            penalty: 2.0,
            quality: QualityKind::Cohesiveness,
            max_seeds: None,
        }
    }
}

impl ClusteringConfig {
    /// Create a new configuration with custom values
    pub fn new(min_size: usize, min_density: f64, penalty: f64, quality: QualityKind) -> Self {
        Self {
            min_size,
            min_density,
            penalty,
            quality,
            max_seeds: None,
        }
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(EngineError::InvalidConfig("min_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_density) {
            return Err(EngineError::InvalidConfig(format!(
                "min_density must be within [0, 1], got {}",
                self.min_density
            )));
        }
        if !self.penalty.is_finite() || self.penalty < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "penalty must be a non-negative number, got {}",
                self.penalty
            )));
        }
        Ok(())
    }

    pub fn quality_function(&self) -> Arc<dyn QualityFunction> {
        self.quality.build(self.penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClusteringConfig::default();
        assert_eq!(config.min_size, 3);
        assert_eq!(config.penalty, 2.0);
        assert_eq!(config.quality, QualityKind::Cohesiveness);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = ClusteringConfig::default();
        config.penalty = -1.0;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let mut config = ClusteringConfig::default();
        config.min_density = 1.5;
        assert!(config.validate().is_err());

        let mut config = ClusteringConfig::default();
        config.min_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"penalty": 1.0, "quality": "density"}}"#).unwrap();

        let config = ClusteringConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.penalty, 1.0);
        assert_eq!(config.quality, QualityKind::Density);
        assert_eq!(config.min_size, 3);
        assert_eq!(config.quality_function().name(), "density");
    }

    #[test]
    fn quality_kind_parses_case_insensitively() {
        assert_eq!("Cohesiveness".parse::<QualityKind>(), Ok(QualityKind::Cohesiveness));
        assert!("modularity".parse::<QualityKind>().is_err());
    }
}
