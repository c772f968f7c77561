//! Repository-level baselines for z-score analysis
//!
//! A baseline maps each of the nine tracked metrics to the mean and sample
//! standard deviation observed across a repository's merged pull requests.
//!
//! Population rules:
//! - Only merged PRs qualify. Fewer than `min_sample_size` qualifying PRs
//!   fails the whole computation with `InsufficientData`.
//! - Raw metrics are read from every qualifying PR.
//! - Engineered metrics are read only from qualifying PRs with computed
//!   features; null values are dropped. An engineered metric left with too
//!   few samples degrades to a (0, 0) placeholder instead of failing, which
//!   downstream yields a z-score of 0.0.

use crate::error::{OutlierError, Result};
use crate::features::{raw_value, EngineeredFeatures};
use crate::metric::{Metric, MetricKind};
use crate::record::{PrId, PullRequestRecord};
use crate::stats::{metric_stats, MetricStats};
use serde::Serialize;
use std::collections::HashMap;

/// Baseline for a single metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricBaseline {
    pub mean: f64,
    pub std_dev: f64,
    /// Non-null samples the statistics were computed from
    pub count: usize,
    /// Placeholder (mean 0, stddev 0) for a metric without enough samples
    pub degraded: bool,
}

impl MetricBaseline {
    fn from_stats(stats: MetricStats) -> Self {
        Self {
            mean: stats.mean,
            std_dev: stats.std_dev,
            count: stats.count,
            degraded: false,
        }
    }

    fn placeholder(count: usize) -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            count,
            degraded: true,
        }
    }
}

/// Per-metric baselines for one repository at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryBaseline {
    repository: String,
    metrics: [MetricBaseline; 9],
    sample_size: usize,
}

impl RepositoryBaseline {
    /// Compute the baseline from a repository's PR population
    ///
    /// `features` is keyed by PR id; records lacking features still count
    /// towards raw metrics and the sample size.
    ///
    /// # Errors
    /// `InsufficientData` if fewer than `min_sample_size` PRs are merged, or
    /// if a raw metric cannot be computed.
    pub fn compute(
        repository: &str,
        prs: &[PullRequestRecord],
        features: &HashMap<PrId, EngineeredFeatures>,
        min_sample_size: usize,
    ) -> Result<Self> {
        let merged: Vec<&PullRequestRecord> = prs.iter().filter(|pr| pr.is_merged()).collect();

        if merged.len() < min_sample_size {
            return Err(OutlierError::insufficient(
                min_sample_size,
                merged.len(),
                format!("repository {} (merged pull requests)", repository),
            ));
        }

        let with_features: Vec<&EngineeredFeatures> = merged
            .iter()
            .filter_map(|pr| pr.id.and_then(|id| features.get(&id)))
            .collect();

        tracing::debug!(
            repository,
            merged = merged.len(),
            with_features = with_features.len(),
            "computing repository baseline"
        );

        let mut metrics = [MetricBaseline::placeholder(0); 9];

        for metric in Metric::ALL {
            let values: Vec<Option<f64>> = match metric.kind() {
                MetricKind::Raw => merged.iter().map(|pr| raw_value(pr, metric)).collect(),
                MetricKind::Engineered => with_features.iter().map(|f| f.value(metric)).collect(),
            };

            metrics[metric.index()] = match (metric_stats(&values, min_sample_size), metric.kind()) {
                (Ok(stats), _) => MetricBaseline::from_stats(stats),
                (Err(e), MetricKind::Raw) => return Err(e),
                (Err(e), MetricKind::Engineered) => {
                    let available = values.iter().flatten().count();
                    tracing::warn!(
                        repository,
                        metric = metric.name(),
                        available,
                        "degraded baseline: {}",
                        e
                    );
                    MetricBaseline::placeholder(available)
                }
            };
        }

        Ok(Self {
            repository: repository.to_string(),
            metrics,
            sample_size: merged.len(),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn get(&self, metric: Metric) -> &MetricBaseline {
        &self.metrics[metric.index()]
    }

    /// Number of qualifying (merged) PRs; recorded on every resulting score
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Metrics that fell back to the placeholder baseline
    pub fn degraded_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.get(*m).degraded)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricBaseline)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}
