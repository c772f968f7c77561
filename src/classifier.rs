//! Per-PR outlier classification against a repository baseline
//!
//! Classification is a pure decision: one record, its features, the shared
//! baseline and a threshold in; an [`OutlierResult`] out. Nothing is written
//! here; persisting results is the caller's job (see [`crate::pipeline`]).

use crate::baseline::RepositoryBaseline;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::{raw_value, EngineeredFeatures};
use crate::metric::{Metric, MetricKind, ZScores};
use crate::record::{PrId, PullRequestRecord};
use crate::stats::{is_outlier, z_score};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of scoring one pull request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierResult {
    pub pr_id: PrId,
    pub pr_number: u64,
    pub title: String,
    pub author: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub is_outlier: bool,
    /// Metrics whose |z| exceeded the threshold, in metric declaration order
    pub outlier_features: Vec<Metric>,
    pub max_abs_z_score: f64,
    pub z_scores: ZScores,
}

/// Baseline plus one result per classified PR
#[derive(Debug, Clone)]
pub struct Detection {
    pub baseline: RepositoryBaseline,
    pub results: Vec<OutlierResult>,
}

impl Detection {
    pub fn outliers(&self) -> impl Iterator<Item = &OutlierResult> {
        self.results.iter().filter(|r| r.is_outlier)
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers().count()
    }
}

/// Outliers only, most recently merged first; unmerged last
pub fn outliers_by_recency(results: &[OutlierResult]) -> Vec<&OutlierResult> {
    let mut outliers: Vec<&OutlierResult> = results.iter().filter(|r| r.is_outlier).collect();
    outliers.sort_by(|a, b| b.merged_at.cmp(&a.merged_at));
    outliers
}

/// Score one pull request against the baseline
///
/// Raw metrics always produce a z-score. Engineered metrics produce one only
/// when the PR's value is non-null; null values leave the z-score `None` and
/// take no part in the decision.
pub fn classify(
    pr: &PullRequestRecord,
    features: &EngineeredFeatures,
    baseline: &RepositoryBaseline,
    threshold: f64,
) -> OutlierResult {
    let mut z_scores = ZScores::default();
    let mut outlier_features = Vec::new();

    for metric in Metric::ALL {
        let value = match metric.kind() {
            MetricKind::Raw => raw_value(pr, metric),
            MetricKind::Engineered => features.value(metric),
        };

        let z = value.map(|v| {
            let b = baseline.get(metric);
            z_score(v, b.mean, b.std_dev)
        });

        if let Some(z) = z {
            if is_outlier(z, threshold) {
                outlier_features.push(metric);
            }
        }
        z_scores.set(metric, z);
    }

    OutlierResult {
        pr_id: features.pull_request_id,
        pr_number: pr.number,
        title: pr.title.clone(),
        author: pr.author.clone(),
        merged_at: pr.merged_at,
        is_outlier: !outlier_features.is_empty(),
        outlier_features,
        max_abs_z_score: z_scores.max_abs(),
        z_scores,
    }
}

/// Compute the repository baseline, then classify every merged PR that has
/// features, in input order
///
/// # Errors
/// Propagates `InsufficientData` from the baseline; in that case no PR is
/// classified.
pub fn detect_outliers(
    repository: &str,
    prs: &[PullRequestRecord],
    features: &HashMap<PrId, EngineeredFeatures>,
    config: &AnalysisConfig,
) -> Result<Detection> {
    let baseline = RepositoryBaseline::compute(repository, prs, features, config.min_sample_size)?;

    let results: Vec<OutlierResult> = prs
        .iter()
        .filter(|pr| pr.is_merged())
        .filter_map(|pr| {
            let f = pr.id.and_then(|id| features.get(&id))?;
            Some(classify(pr, f, &baseline, config.threshold))
        })
        .collect();

    let detection = Detection { baseline, results };

    tracing::info!(
        repository,
        analyzed = detection.results.len(),
        outliers = detection.outlier_count(),
        threshold = config.threshold,
        "outlier detection complete"
    );

    Ok(detection)
}
