//! Loading pull requests from a hosting-API export
//!
//! The export is the JSON array returned by the pull-request listing
//! endpoint (one object per PR, fields named as the API names them).

use crate::error::{OutlierError, Result};
use crate::record::{PrState, PullRequestRecord};
use crate::repo_ref::RepositoryRef;
use crate::store::Store;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

/// One pull request as exported from the hosting API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub user: Option<ApiUser>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
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
    pub html_url: String,
}

impl ApiPullRequest {
    /// Convert to a store record
    ///
    /// # Errors
    /// `Validation` if the line or comment counts cannot be summed in a `u64`.
    pub fn into_record(self, repository_name: &str) -> Result<PullRequestRecord> {
        let overflow = |what: &str| {
            OutlierError::Validation(format!(
                "pull request {}#{}: {} overflow a 64-bit count",
                repository_name, self.number, what
            ))
        };
        if self.additions.checked_add(self.deletions).is_none() {
            return Err(overflow("additions + deletions"));
        }
        if self.comments.checked_add(self.review_comments).is_none() {
            return Err(overflow("comments + review_comments"));
        }

        Ok(PullRequestRecord {
            id: None,
            repository_name: repository_name.to_string(),
            number: self.number,
            title: self.title,
            // Deleted accounts come back without a user
            author: self
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| "ghost".to_string()),
            created_at: self.created_at,
            merged_at: self.merged_at,
            closed_at: self.closed_at,
            additions: self.additions,
            deletions: self.deletions,
            changed_files: self.changed_files,
            comments: self.comments,
            review_comments: self.review_comments,
            state: self.state,
            url: self.html_url,
        })
    }
}

/// Inclusive creation-date window; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parse optional `YYYY-MM-DD` bounds
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let range = Self {
            start: start.map(parse_date).transpose()?,
            end: end.map(parse_date).transpose()?,
        };

        if let (Some(s), Some(e)) = (range.start, range.end) {
            if s > e {
                return Err(OutlierError::Validation(format!(
                    "start date {} is after end date {}",
                    s, e
                )));
            }
        }
        Ok(range)
    }

    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        let day = created_at.date_naive();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        OutlierError::Validation(format!("invalid date '{}': expected YYYY-MM-DD ({})", s, e))
    })
}

/// Outcome of an ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// PRs present in the export
    pub read: usize,
    /// PRs inside the date range, upserted into the store
    pub saved: usize,
}

pub fn parse_export(json: &str) -> Result<Vec<ApiPullRequest>> {
    Ok(serde_json::from_str(json)?)
}

/// Upsert every exported PR created within `range`
///
/// Records are all converted before the first upsert, so an invalid PR
/// leaves the store untouched.
pub fn ingest<S: Store>(
    store: &mut S,
    repo: &RepositoryRef,
    exported: Vec<ApiPullRequest>,
    range: DateRange,
) -> Result<IngestSummary> {
    let repository = repo.full_name();
    let mut summary = IngestSummary {
        read: exported.len(),
        saved: 0,
    };

    let records = exported
        .into_iter()
        .filter(|pr| range.contains(pr.created_at))
        .map(|pr| pr.into_record(&repository))
        .collect::<Result<Vec<_>>>()?;

    for record in records {
        store.upsert_pull_request(record)?;
        summary.saved += 1;
    }

    tracing::info!(
        repository = %repository,
        read = summary.read,
        saved = summary.saved,
        "ingested pull requests"
    );
    Ok(summary)
}

/// Read an export file and ingest it
pub fn ingest_file<S: Store>(
    store: &mut S,
    repo: &RepositoryRef,
    path: &Path,
    range: DateRange,
) -> Result<IngestSummary> {
    let content = std::fs::read_to_string(path)?;
    ingest(store, repo, parse_export(&content)?, range)
}
