//! Configuration for z-score outlier detection

use crate::error::{OutlierError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters consumed by baseline computation and classification
///
/// # Example
/// ```
/// use prscope::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.min_sample_size, 30);
/// assert_eq!(config.threshold, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum merged PRs (and non-null samples per metric) for a usable baseline
    ///
    /// Default: 30
    pub min_sample_size: usize,

    /// Absolute z-score a metric must strictly exceed to flag a PR
    ///
    /// - 2.0 (default): roughly the two-sided 95% interval of a normal distribution
    /// - 3.0: stricter, only extreme PRs
    pub threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 30,
            threshold: 2.0,
        }
    }
}

impl AnalysisConfig {
    /// Fewer, more extreme outliers
    pub fn strict() -> Self {
        Self {
            min_sample_size: 30,
            threshold: 3.0,
        }
    }

    /// Smaller repositories, more flagged PRs
    pub fn permissive() -> Self {
        Self {
            min_sample_size: 10,
            threshold: 1.5,
        }
    }

    /// Load from a TOML file; missing keys take their default values
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration
    pub fn with_overrides(mut self, min_sample_size: Option<usize>, threshold: Option<f64>) -> Self {
        if let Some(min) = min_sample_size {
            self.min_sample_size = min;
        }
        if let Some(t) = threshold {
            self.threshold = t;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_sample_size < 2 {
            return Err(OutlierError::Validation(format!(
                "min_sample_size must be >= 2 for a sample standard deviation, got {}",
                self.min_sample_size
            )));
        }

        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(OutlierError::Validation(format!(
                "threshold must be a positive number, got {}",
                self.threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.min_sample_size, 30);
        assert_eq!(config.threshold, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert_eq!(AnalysisConfig::strict().threshold, 3.0);
        assert_eq!(AnalysisConfig::permissive().min_sample_size, 10);
        assert!(AnalysisConfig::strict().validate().is_ok());
        assert!(AnalysisConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_invalid_min_sample_size() {
        let config = AnalysisConfig {
            min_sample_size: 1,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_threshold() {
        for threshold in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = AnalysisConfig {
                threshold,
                ..AnalysisConfig::default()
            };
            assert!(config.validate().is_err(), "threshold {} accepted", threshold);
        }
    }

    #[test]
    fn test_overrides() {
        let config = AnalysisConfig::default().with_overrides(Some(50), None);
        assert_eq!(config.min_sample_size, 50);
        assert_eq!(config.threshold, 2.0);

        let config = config.with_overrides(None, Some(2.5));
        assert_eq!(config.threshold, 2.5);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "threshold = 2.5").unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.threshold, 2.5);
        assert_eq!(config.min_sample_size, 30);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_sample_size = 0").unwrap();
        assert!(AnalysisConfig::from_file(file.path()).is_err());
    }
}
