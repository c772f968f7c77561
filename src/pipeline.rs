//! End-to-end analysis of one repository against a [`Store`]
//!
//! 1. Compute and upsert features for every persisted PR of the repository
//! 2. Build the baseline and classify (read barrier: the whole population
//!    is read before any PR is scored)
//! 3. Upsert one score per classified PR
//!
//! If step 2 fails no score is written. Re-running overwrites prior scores.

use crate::classifier::{detect_outliers, Detection};
use crate::config::AnalysisConfig;
use crate::error::{OutlierError, Result};
use crate::features::EngineeredFeatures;
use crate::record::PrId;
use crate::store::{OutlierScore, Store};
use chrono::{DateTime, Utc};

/// Compute and persist features for every stored PR of a repository
///
/// Returns the number of PRs whose features were written.
pub fn compute_repository_features<S: Store>(
    store: &mut S,
    repository: &str,
    computed_at: DateTime<Utc>,
) -> Result<usize> {
    let prs = store.pull_requests(repository)?;
    for pr in &prs {
        store.upsert_features(EngineeredFeatures::for_record(pr)?, computed_at)?;
    }
    tracing::debug!(repository, count = prs.len(), "computed features");
    Ok(prs.len())
}

/// Detect outliers from what the store currently holds, without writing
pub fn detect_outliers_for_repository<S: Store>(
    store: &S,
    repository: &str,
    config: &AnalysisConfig,
) -> Result<Detection> {
    config.validate()?;

    let prs = store.pull_requests(repository)?;
    let ids: Vec<PrId> = prs.iter().filter_map(|pr| pr.id).collect();
    let features = store.features_for(&ids)?;

    detect_outliers(repository, &prs, &features, config)
}

/// Persist one score per result, stamped with the baseline's sample size
pub fn save_outlier_scores<S: Store>(
    store: &mut S,
    detection: &Detection,
    computed_at: DateTime<Utc>,
) -> Result<()> {
    let repository = detection.baseline.repository();
    let sample_size = detection.baseline.sample_size();

    for result in &detection.results {
        store.upsert_outlier_score(OutlierScore::from_result(
            result,
            repository,
            sample_size,
            computed_at,
        ))?;
    }
    Ok(())
}

/// Features, detection and score persistence for one repository
///
/// # Errors
/// - `Validation` if the repository has no stored PRs or the config is invalid
/// - `InsufficientData` if the baseline cannot be computed; no scores are
///   written in that case
pub fn analyze_repository<S: Store>(
    store: &mut S,
    repository: &str,
    config: &AnalysisConfig,
    computed_at: DateTime<Utc>,
) -> Result<Detection> {
    config.validate()?;

    if compute_repository_features(store, repository, computed_at)? == 0 {
        return Err(OutlierError::Validation(format!(
            "no pull requests stored for {}; ingest them first",
            repository
        )));
    }

    let detection = detect_outliers_for_repository(store, repository, config)?;
    save_outlier_scores(store, &detection, computed_at)?;

    Ok(detection)
}
