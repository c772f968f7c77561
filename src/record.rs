//! Pull-request records as held by the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identity of a persisted pull request
pub type PrId = u64;

/// Lifecycle state reported by the hosting API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

/// Raw metadata for one pull request
///
/// Unique by `(repository_name, number)`. `id` is `None` until the store
/// has persisted the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    #[serde(default)]
    pub id: Option<PrId>,
    pub repository_name: String,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub review_comments: u64,
    pub state: PrState,
    pub url: String,
}

impl PullRequestRecord {
    /// Merged PRs form the population a repository baseline is built from
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Unique key: `(repository_name, number)`
    pub fn identity(&self) -> (String, u64) {
        (self.repository_name.clone(), self.number)
    }

    /// True when `other` names the same pull request
    pub fn same_identity(&self, other: &PullRequestRecord) -> bool {
        self.repository_name == other.repository_name && self.number == other.number
    }

    /// Copy of this record carrying the given store id
    pub fn with_id(self, id: PrId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}
