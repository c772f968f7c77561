//! Engineered features derived from a raw pull-request record
//!
//! Every derived value is a pure function of the record. Ratios whose
//! denominator is zero are `None`: a PR that touches no files has no
//! per-file comment density, which is different from a density of zero.

use crate::error::{OutlierError, Result};
use crate::metric::{Metric, MetricKind};
use crate::record::{PrId, PullRequestRecord};
use serde::{Deserialize, Serialize};

/// Derived metrics for one pull request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputedFeatures {
    /// Hours from creation to merge, `None` while unmerged
    pub review_duration_hours: Option<f64>,
    /// additions + deletions, saturating at `u64::MAX`
    pub code_churn: u64,
    /// comments + review_comments, saturating at `u64::MAX`
    pub total_comments: u64,
    /// total_comments / changed_files, `None` when no files changed
    pub comment_density_per_file: Option<f64>,
    /// total_comments / code_churn, `None` when churn is zero
    pub comment_density_per_line: Option<f64>,
}

/// Features attached to a persisted pull request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    pub pull_request_id: PrId,
    #[serde(flatten)]
    pub values: ComputedFeatures,
}

/// Compute engineered features for a record
///
/// Ingestion rejects counts whose sums overflow; sums here saturate so a
/// record built elsewhere never wraps to a zero churn.
pub fn compute_features(pr: &PullRequestRecord) -> ComputedFeatures {
    let review_duration_hours = pr
        .merged_at
        .map(|merged_at| (merged_at - pr.created_at).num_seconds() as f64 / 3600.0);

    let code_churn = pr.additions.saturating_add(pr.deletions);
    let total_comments = pr.comments.saturating_add(pr.review_comments);

    let comment_density_per_file = if pr.changed_files > 0 {
        Some(total_comments as f64 / pr.changed_files as f64)
    } else {
        None
    };

    let comment_density_per_line = if code_churn > 0 {
        Some(total_comments as f64 / code_churn as f64)
    } else {
        None
    };

    ComputedFeatures {
        review_duration_hours,
        code_churn,
        total_comments,
        comment_density_per_file,
        comment_density_per_line,
    }
}

impl EngineeredFeatures {
    /// Compute features for a record that the store has already persisted
    ///
    /// # Errors
    /// `Validation` if the record has no store-assigned id.
    pub fn for_record(pr: &PullRequestRecord) -> Result<Self> {
        let pull_request_id = pr.id.ok_or_else(|| {
            OutlierError::Validation(format!(
                "pull request {}#{} must be persisted before computing features",
                pr.repository_name, pr.number
            ))
        })?;

        Ok(Self {
            pull_request_id,
            values: compute_features(pr),
        })
    }

    /// Value of an engineered metric; `None` for raw metrics and null features
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::ReviewDurationHours => self.values.review_duration_hours,
            Metric::CodeChurn => Some(self.values.code_churn as f64),
            Metric::CommentDensityPerFile => self.values.comment_density_per_file,
            Metric::CommentDensityPerLine => self.values.comment_density_per_line,
            m => {
                debug_assert_eq!(m.kind(), MetricKind::Raw);
                None
            }
        }
    }
}

/// Value of a raw metric taken directly from the record
pub fn raw_value(pr: &PullRequestRecord, metric: Metric) -> Option<f64> {
    let value = match metric {
        Metric::Additions => pr.additions,
        Metric::Deletions => pr.deletions,
        Metric::ChangedFiles => pr.changed_files,
        Metric::Comments => pr.comments,
        Metric::ReviewComments => pr.review_comments,
        _ => return None,
    };
    Some(value as f64)
}
