//! Dashboard configuration
//!
//! Dataset and model locations are passed in explicitly rather than looked up
//! relative to the executable, so every collaborator can be pointed at a
//! temporary directory in tests.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Horizon slider bounds offered to the user, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonLimits {
    pub min: usize,
    pub max: usize,
    pub step: usize,
}

impl Default for HorizonLimits {
    fn default() -> Self {
        Self {
            min: 7,
            max: 42,
            step: 7,
        }
    }
}

impl HorizonLimits {
    /// Horizons the user may pick, ascending
    pub fn choices(&self) -> Vec<usize> {
        if self.step == 0 {
            return vec![self.min];
        }
        (self.min..=self.max).step_by(self.step).collect()
    }
}

/// Locations and defaults for one dashboard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Processed sales CSV
    pub data_path: PathBuf,
    /// Directory holding `sarima/` and `prophet/` model files
    pub model_dir: PathBuf,
    /// Number of store segments
    pub cluster_count: usize,
    /// Seed for the segmentation k-means
    pub cluster_seed: u64,
    /// Horizon choices offered to the user
    pub horizon_limits: HorizonLimits,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/processed/rossmann_features.csv"),
            model_dir: PathBuf::from("models"),
            cluster_count: 3,
            cluster_seed: crate::segmentation::DEFAULT_SEED,
            horizon_limits: HorizonLimits::default(),
        }
    }
}

impl DashboardConfig {
    /// Load a JSON configuration file; omitted fields take their defaults.
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::InvalidParameter(format!(
                "cannot read config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;

        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(config.with_base_dir(dir)),
            _ => Ok(config),
        }
    }

    /// Resolve relative paths against `base`
    pub fn with_base_dir<P: AsRef<Path>>(mut self, base: P) -> Self {
        let base = base.as_ref();
        if self.data_path.is_relative() {
            self.data_path = base.join(&self.data_path);
        }
        if self.model_dir.is_relative() {
            self.model_dir = base.join(&self.model_dir);
        }
        self
    }

    /// Check the numeric settings
    pub fn validate(&self) -> Result<()> {
        if self.cluster_count == 0 {
            return Err(ForecastError::InvalidParameter(
                "cluster_count must be at least 1".to_string(),
            ));
        }
        let limits = &self.horizon_limits;
        if limits.min == 0 || limits.min > limits.max || limits.max > crate::models::MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon_limits {}..{} must lie within 1..={}",
                limits.min,
                limits.max,
                crate::models::MAX_HORIZON
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_dashboard() {
        let config = DashboardConfig::default();
        assert_eq!(config.cluster_count, 3);
        assert_eq!(config.cluster_seed, 42);
        assert_eq!(config.horizon_limits.choices(), vec![7, 14, 21, 28, 35, 42]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "model_dir": "/srv/models", "cluster_count": 4 }"#).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.cluster_count, 4);
        assert_eq!(
            config.data_path,
            PathBuf::from("data/processed/rossmann_features.csv")
        );
    }

    #[test]
    fn test_with_base_dir_keeps_absolute_paths() {
        let config = DashboardConfig {
            model_dir: PathBuf::from("/srv/models"),
            ..DashboardConfig::default()
        }
        .with_base_dir("/opt/app");

        assert_eq!(
            config.data_path,
            PathBuf::from("/opt/app/data/processed/rossmann_features.csv")
        );
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
    }

    #[test]
    fn test_validate_rejects_zero_clusters() {
        let config = DashboardConfig {
            cluster_count: 0,
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
