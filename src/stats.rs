//! Numeric primitives for z-score outlier detection
//!
//! Mean and **sample** standard deviation (n-1 denominator), z-scores and the
//! exclusive threshold test. Everything here is a pure function of its inputs
//! so that baselines and scores are reproducible bit-for-bit across runs.

use crate::error::{OutlierError, Result};
use serde::{Deserialize, Serialize};

/// Summary statistics for a single metric across a population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Number of non-null observations
    pub count: usize,
}

/// Compute mean and sample standard deviation
///
/// # Errors
/// `InsufficientData` if fewer than 2 values are supplied.
///
/// # Example
/// ```
/// use prscope::stats::mean_and_stddev;
///
/// let (mean, stddev) = mean_and_stddev(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(mean, 3.0);
/// assert!((stddev - 1.5811).abs() < 1e-4);
/// ```
pub fn mean_and_stddev(values: &[f64]) -> Result<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return Err(OutlierError::insufficient(2, n, "mean and standard deviation"));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

    Ok((mean, variance.sqrt()))
}

/// Signed distance of `value` from `mean` in units of `std_dev`
///
/// A constant-valued metric (`std_dev == 0`) carries no outlier signal, so
/// the z-score is exactly 0.0 rather than infinite or NaN.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return 0.0;
    }
    (value - mean) / std_dev
}

/// `|z| > threshold`; a z-score exactly at the threshold is not an outlier
pub fn is_outlier(z: f64, threshold: f64) -> bool {
    z.abs() > threshold
}

/// Compute stats for one metric, ignoring null observations
///
/// # Errors
/// `InsufficientData` if fewer than `min_sample_size` non-null values
/// remain (or fewer than 2, whichever is larger).
pub fn metric_stats(values: &[Option<f64>], min_sample_size: usize) -> Result<MetricStats> {
    let valid: Vec<f64> = values.iter().flatten().copied().collect();

    if valid.len() < min_sample_size {
        return Err(OutlierError::insufficient(
            min_sample_size,
            valid.len(),
            "reliable metric statistics",
        ));
    }

    let (mean, std_dev) = mean_and_stddev(&valid)?;

    Ok(MetricStats {
        mean,
        std_dev,
        count: valid.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_stddev_uses_sample_variance() {
        let (mean, stddev) = mean_and_stddev(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(mean, 3.0);
        assert!((stddev - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mean_and_stddev_two_values() {
        let (mean, stddev) = mean_and_stddev(&[10.0, 20.0]).unwrap();
        assert_eq!(mean, 15.0);
        assert!((stddev - 7.0711).abs() < 1e-4);
    }

    #[test]
    fn test_mean_and_stddev_rejects_single_value() {
        let err = mean_and_stddev(&[42.0]).unwrap_err();
        assert!(err.is_insufficient_data());
        assert!(mean_and_stddev(&[]).is_err());
    }

    #[test]
    fn test_mean_and_stddev_constant_values() {
        let (mean, stddev) = mean_and_stddev(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(mean, 5.0);
        assert_eq!(stddev, 0.0);
    }

    #[test]
    fn test_z_score_basic() {
        assert_eq!(z_score(20.0, 10.0, 5.0), 2.0);
        assert_eq!(z_score(0.0, 10.0, 5.0), -2.0);
        assert_eq!(z_score(10.0, 10.0, 5.0), 0.0);
    }

    #[test]
    fn test_z_score_zero_stddev() {
        assert_eq!(z_score(1000.0, 10.0, 0.0), 0.0);
        assert_eq!(z_score(-3.0, 7.5, 0.0), 0.0);
    }

    #[test]
    fn test_is_outlier_boundary_is_exclusive() {
        assert!(!is_outlier(2.0, 2.0));
        assert!(!is_outlier(-2.0, 2.0));
        assert!(is_outlier(2.0001, 2.0));
        assert!(is_outlier(-2.0001, 2.0));
        assert!(!is_outlier(1.5, 2.0));
    }

    #[test]
    fn test_metric_stats_filters_nulls() {
        let values = vec![Some(1.0), None, Some(2.0), Some(3.0), None];
        let stats = metric_stats(&values, 3).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std_dev, 1.0);
    }

    #[test]
    fn test_metric_stats_below_minimum() {
        let values = vec![Some(1.0), None, Some(2.0)];
        match metric_stats(&values, 30) {
            Err(OutlierError::InsufficientData {
                required, actual, ..
            }) => {
                assert_eq!(required, 30);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected InsufficientData, got {:?}", other),
        }
    }
}
