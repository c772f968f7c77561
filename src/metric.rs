//! The nine tracked metrics and the fixed z-score record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a metric comes straight from the PR record or is derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Raw,
    Engineered,
}

/// A metric tracked by the repository baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Additions,
    Deletions,
    ChangedFiles,
    Comments,
    ReviewComments,
    ReviewDurationHours,
    CodeChurn,
    CommentDensityPerFile,
    CommentDensityPerLine,
}

impl Metric {
    /// All metrics in declaration order: raw first, then engineered
    pub const ALL: [Metric; 9] = [
        Metric::Additions,
        Metric::Deletions,
        Metric::ChangedFiles,
        Metric::Comments,
        Metric::ReviewComments,
        Metric::ReviewDurationHours,
        Metric::CodeChurn,
        Metric::CommentDensityPerFile,
        Metric::CommentDensityPerLine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Additions => "additions",
            Metric::Deletions => "deletions",
            Metric::ChangedFiles => "changed_files",
            Metric::Comments => "comments",
            Metric::ReviewComments => "review_comments",
            Metric::ReviewDurationHours => "review_duration_hours",
            Metric::CodeChurn => "code_churn",
            Metric::CommentDensityPerFile => "comment_density_per_file",
            Metric::CommentDensityPerLine => "comment_density_per_line",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::Additions
            | Metric::Deletions
            | Metric::ChangedFiles
            | Metric::Comments
            | Metric::ReviewComments => MetricKind::Raw,
            Metric::ReviewDurationHours
            | Metric::CodeChurn
            | Metric::CommentDensityPerFile
            | Metric::CommentDensityPerLine => MetricKind::Engineered,
        }
    }

    /// Position in [`Metric::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-metric z-scores for one PR
///
/// `None` means the underlying value was null, so the metric took no part in
/// the outlier decision. Serialized with `z_<metric>` keys; nulls are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_additions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_deletions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_changed_files: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_comments: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_review_comments: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_review_duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_code_churn: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_comment_density_per_file: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_comment_density_per_line: Option<f64>,
}

impl ZScores {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Additions => self.z_additions,
            Metric::Deletions => self.z_deletions,
            Metric::ChangedFiles => self.z_changed_files,
            Metric::Comments => self.z_comments,
            Metric::ReviewComments => self.z_review_comments,
            Metric::ReviewDurationHours => self.z_review_duration_hours,
            Metric::CodeChurn => self.z_code_churn,
            Metric::CommentDensityPerFile => self.z_comment_density_per_file,
            Metric::CommentDensityPerLine => self.z_comment_density_per_line,
        }
    }

    pub fn set(&mut self, metric: Metric, z: Option<f64>) {
        let slot = match metric {
            Metric::Additions => &mut self.z_additions,
            Metric::Deletions => &mut self.z_deletions,
            Metric::ChangedFiles => &mut self.z_changed_files,
            Metric::Comments => &mut self.z_comments,
            Metric::ReviewComments => &mut self.z_review_comments,
            Metric::ReviewDurationHours => &mut self.z_review_duration_hours,
            Metric::CodeChurn => &mut self.z_code_churn,
            Metric::CommentDensityPerFile => &mut self.z_comment_density_per_file,
            Metric::CommentDensityPerLine => &mut self.z_comment_density_per_line,
        };
        *slot = z;
    }

    /// Non-null z-scores in metric declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL
            .iter()
            .filter_map(move |&m| self.get(m).map(|z| (m, z)))
    }

    /// Largest |z| among non-null scores, 0.0 if none were computed
    pub fn max_abs(&self) -> f64 {
        self.iter().map(|(_, z)| z.abs()).fold(0.0, f64::max)
    }
}
