//! Persistence for PR records, engineered features and outlier scores
//!
//! All writes are upserts keyed by a unique constraint:
//! - pull requests by `(repository_name, number)`
//! - features and scores by owning PR id
//!
//! An upsert never mutates a stored value in place: the incoming value is
//! built in full, matched against the stored identity, then overwrites it.

use crate::classifier::OutlierResult;
use crate::error::{OutlierError, Result};
use crate::features::EngineeredFeatures;
use crate::metric::{Metric, ZScores};
use crate::record::{PrId, PullRequestRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Features as persisted, with the time they were computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeatures {
    #[serde(flatten)]
    pub features: EngineeredFeatures,
    pub computed_at: DateTime<Utc>,
}

/// Persisted outcome of outlier classification for one PR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierScore {
    pub pull_request_id: PrId,
    pub repository_name: String,
    #[serde(flatten)]
    pub z_scores: ZScores,
    pub is_outlier: bool,
    pub outlier_features: Vec<Metric>,
    pub max_abs_z_score: f64,
    /// Qualifying PRs the baseline was computed from
    pub sample_size: usize,
    pub computed_at: DateTime<Utc>,
}

impl OutlierScore {
    pub fn from_result(
        result: &OutlierResult,
        repository_name: &str,
        sample_size: usize,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pull_request_id: result.pr_id,
            repository_name: repository_name.to_string(),
            z_scores: result.z_scores,
            is_outlier: result.is_outlier,
            outlier_features: result.outlier_features.clone(),
            max_abs_z_score: result.max_abs_z_score,
            sample_size,
            computed_at,
        }
    }

    /// Rebuild a renderable result by joining with the owning record
    pub fn to_result(&self, pr: &PullRequestRecord) -> OutlierResult {
        OutlierResult {
            pr_id: self.pull_request_id,
            pr_number: pr.number,
            title: pr.title.clone(),
            author: pr.author.clone(),
            merged_at: pr.merged_at,
            is_outlier: self.is_outlier,
            outlier_features: self.outlier_features.clone(),
            max_abs_z_score: self.max_abs_z_score,
            z_scores: self.z_scores,
        }
    }
}

/// Storage backend for the analysis pipeline
pub trait Store {
    /// Insert or update by `(repository_name, number)`; returns the stored
    /// record with its assigned id. Any incoming `id` is ignored.
    fn upsert_pull_request(&mut self, record: PullRequestRecord) -> Result<PullRequestRecord>;

    /// All records for a repository, ordered by id
    fn pull_requests(&self, repository: &str) -> Result<Vec<PullRequestRecord>>;

    fn pull_request(&self, id: PrId) -> Result<Option<PullRequestRecord>>;

    /// Features for the given PR ids; ids without features are absent
    fn features_for(&self, ids: &[PrId]) -> Result<HashMap<PrId, EngineeredFeatures>>;

    fn upsert_features(
        &mut self,
        features: EngineeredFeatures,
        computed_at: DateTime<Utc>,
    ) -> Result<()>;

    fn upsert_outlier_score(&mut self, score: OutlierScore) -> Result<()>;

    /// Scores for a repository ordered by max |z| descending
    fn outlier_scores(&self, repository: &str, outliers_only: bool) -> Result<Vec<OutlierScore>>;

    /// Remove every record, feature and score
    fn clear(&mut self) -> Result<()>;
}

/// In-memory store that can be snapshotted to a JSON file
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    next_id: PrId,
    pull_requests: BTreeMap<PrId, PullRequestRecord>,
    features: BTreeMap<PrId, StoredFeatures>,
    scores: BTreeMap<PrId, OutlierScore>,
    /// `(repository_name, number)` -> id; derived from `pull_requests`
    #[serde(skip)]
    identities: HashMap<(String, u64), PrId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot, or start empty if the file does not exist yet
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let mut store: MemoryStore = serde_json::from_str(&content)?;
        store.rebuild_identities()?;
        tracing::debug!(
            path = %path.display(),
            pull_requests = store.pull_requests.len(),
            "loaded snapshot"
        );
        Ok(store)
    }

    /// Write the snapshot, replacing any previous file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Rebuild the identity index from the stored records
    ///
    /// # Errors
    /// `Validation` if two records share an identity.
    fn rebuild_identities(&mut self) -> Result<()> {
        self.identities.clear();
        for (id, pr) in &self.pull_requests {
            if let Some(previous) = self.identities.insert(pr.identity(), *id) {
                return Err(OutlierError::Validation(format!(
                    "snapshot holds pull request {}#{} twice (ids {} and {})",
                    pr.repository_name, pr.number, previous, id
                )));
            }
        }
        Ok(())
    }

    fn require_pull_request(&self, id: PrId, what: &str) -> Result<()> {
        if self.pull_requests.contains_key(&id) {
            Ok(())
        } else {
            Err(OutlierError::Validation(format!(
                "cannot store {} for unknown pull request id {}",
                what, id
            )))
        }
    }
}

impl Store for MemoryStore {
    fn upsert_pull_request(&mut self, record: PullRequestRecord) -> Result<PullRequestRecord> {
        let key = record.identity();
        let id = match self.identities.get(&key) {
            Some(&id) => {
                debug_assert!(self.pull_requests[&id].same_identity(&record));
                id
            }
            None => {
                self.next_id += 1;
                self.identities.insert(key, self.next_id);
                self.next_id
            }
        };

        let stored = record.with_id(id);
        self.pull_requests.insert(id, stored.clone());
        Ok(stored)
    }

    fn pull_requests(&self, repository: &str) -> Result<Vec<PullRequestRecord>> {
        Ok(self
            .pull_requests
            .values()
            .filter(|pr| pr.repository_name == repository)
            .cloned()
            .collect())
    }

    fn pull_request(&self, id: PrId) -> Result<Option<PullRequestRecord>> {
        Ok(self.pull_requests.get(&id).cloned())
    }

    fn features_for(&self, ids: &[PrId]) -> Result<HashMap<PrId, EngineeredFeatures>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.features.get(id).map(|f| (*id, f.features)))
            .collect())
    }

    fn upsert_features(
        &mut self,
        features: EngineeredFeatures,
        computed_at: DateTime<Utc>,
    ) -> Result<()> {
        self.require_pull_request(features.pull_request_id, "features")?;
        self.features.insert(
            features.pull_request_id,
            StoredFeatures {
                features,
                computed_at,
            },
        );
        Ok(())
    }

    fn upsert_outlier_score(&mut self, score: OutlierScore) -> Result<()> {
        self.require_pull_request(score.pull_request_id, "outlier score")?;
        self.scores.insert(score.pull_request_id, score);
        Ok(())
    }

    fn outlier_scores(&self, repository: &str, outliers_only: bool) -> Result<Vec<OutlierScore>> {
        let mut scores: Vec<OutlierScore> = self
            .scores
            .values()
            .filter(|s| s.repository_name == repository)
            .filter(|s| !outliers_only || s.is_outlier)
            .cloned()
            .collect();

        scores.sort_by(|a, b| {
            b.max_abs_z_score
                .total_cmp(&a.max_abs_z_score)
                .then(a.pull_request_id.cmp(&b.pull_request_id))
        });
        Ok(scores)
    }

    fn clear(&mut self) -> Result<()> {
        *self = Self::new();
        Ok(())
    }
}
