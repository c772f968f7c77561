//! Property-based tests for the statistics and classification core
//!
//! Covers:
//! 1. z-score and threshold semantics
//! 2. Sample mean / standard deviation
//! 3. Engineered feature computation
//! 4. Per-PR classification against a baseline

use chrono::{Duration, TimeZone, Utc};
use prscope::stats::{is_outlier, mean_and_stddev, metric_stats, z_score};
use prscope::{
    classify, compute_features, EngineeredFeatures, Metric, PrState, PullRequestRecord,
    RepositoryBaseline,
};
use proptest::prelude::*;
use std::collections::HashMap;

fn record(id: u64, a: u64, d: u64, files: u64, c: u64, rc: u64, minutes: i64) -> PullRequestRecord {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    PullRequestRecord {
        id: Some(id),
        repository_name: "prop/repo".to_string(),
        number: id,
        title: format!("PR {}", id),
        author: "prop".to_string(),
        created_at,
        merged_at: Some(created_at + Duration::minutes(minutes)),
        closed_at: None,
        additions: a,
        deletions: d,
        changed_files: files,
        comments: c,
        review_comments: rc,
        state: PrState::Closed,
        url: String::new(),
    }
}

prop_compose! {
    fn arb_record(id: u64)(
        a in 0u64..5000,
        d in 0u64..5000,
        files in 0u64..50,
        c in 0u64..40,
        rc in 0u64..40,
        minutes in 1i64..20_000,
    ) -> PullRequestRecord {
        record(id, a, d, files, c, rc, minutes)
    }
}

fn arb_population() -> impl Strategy<Value = Vec<PullRequestRecord>> {
    (5usize..40).prop_flat_map(|n| {
        (0..n as u64)
            .map(|i| arb_record(i + 1))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_zero_stddev_gives_zero_z(value in -1e9f64..1e9, mean in -1e9f64..1e9) {
        prop_assert_eq!(z_score(value, mean, 0.0), 0.0);
    }

    #[test]
    fn prop_threshold_is_exclusive(threshold in 0.1f64..10.0) {
        prop_assert!(!is_outlier(threshold, threshold));
        prop_assert!(!is_outlier(-threshold, threshold));
        prop_assert!(is_outlier(threshold * 1.01, threshold));
        prop_assert!(is_outlier(-threshold * 1.01, threshold));
    }

    #[test]
    fn prop_z_score_sign_follows_deviation(
        mean in -1000.0f64..1000.0,
        delta in 0.001f64..1000.0,
        std_dev in 0.1f64..100.0,
    ) {
        prop_assert!(z_score(mean + delta, mean, std_dev) > 0.0);
        prop_assert!(z_score(mean - delta, mean, std_dev) < 0.0);
    }

    #[test]
    fn prop_constant_population_has_zero_stddev(c in -1000i32..1000, n in 2usize..50) {
        let values = vec![c as f64; n];
        let (mean, std_dev) = mean_and_stddev(&values).unwrap();
        prop_assert_eq!(mean, c as f64);
        prop_assert_eq!(std_dev, 0.0);
    }

    #[test]
    fn prop_stddev_non_negative(values in prop::collection::vec(-1e6f64..1e6, 2..100)) {
        let (_, std_dev) = mean_and_stddev(&values).unwrap();
        prop_assert!(std_dev >= 0.0);
        prop_assert!(std_dev.is_finite());
    }

    #[test]
    fn prop_metric_stats_ignores_nulls(
        values in prop::collection::vec(prop::option::of(0.0f64..100.0), 0..40),
        min in 2usize..20,
    ) {
        let present = values.iter().flatten().count();
        match metric_stats(&values, min) {
            Ok(stats) => {
                prop_assert!(present >= min);
                prop_assert_eq!(stats.count, present);
            }
            Err(e) => {
                prop_assert!(present < min);
                prop_assert!(e.is_insufficient_data());
            }
        }
    }

    #[test]
    fn prop_features_deterministic(pr in arb_record(1)) {
        prop_assert_eq!(compute_features(&pr), compute_features(&pr));
    }

    #[test]
    fn prop_feature_nulls_follow_denominators(pr in arb_record(1)) {
        let f = compute_features(&pr);
        prop_assert_eq!(f.code_churn, pr.additions + pr.deletions);
        prop_assert_eq!(f.total_comments, pr.comments + pr.review_comments);
        prop_assert_eq!(f.comment_density_per_file.is_none(), pr.changed_files == 0);
        prop_assert_eq!(f.comment_density_per_line.is_none(), f.code_churn == 0);
        prop_assert!(f.review_duration_hours.unwrap() > 0.0);
    }

    #[test]
    fn prop_classification_consistent(prs in arb_population(), threshold in 0.5f64..4.0) {
        let features: HashMap<u64, EngineeredFeatures> = prs
            .iter()
            .map(|pr| {
                let f = EngineeredFeatures::for_record(pr).unwrap();
                (f.pull_request_id, f)
            })
            .collect();
        let baseline = RepositoryBaseline::compute("prop/repo", &prs, &features, 2).unwrap();

        for pr in &prs {
            let result = classify(pr, &features[&pr.id.unwrap()], &baseline, threshold);

            let flagged: Vec<Metric> = result
                .z_scores
                .iter()
                .filter(|(_, z)| z.abs() > threshold)
                .map(|(m, _)| m)
                .collect();
            prop_assert_eq!(&result.outlier_features, &flagged);
            prop_assert_eq!(result.is_outlier, !flagged.is_empty());

            for (_, z) in result.z_scores.iter() {
                prop_assert!(z.abs() <= result.max_abs_z_score);
            }

            // Raw metrics always score
            for metric in [Metric::Additions, Metric::Deletions, Metric::ChangedFiles] {
                prop_assert!(result.z_scores.get(metric).is_some());
            }
            prop_assert_eq!(
                result.z_scores.get(Metric::CommentDensityPerFile).is_none(),
                pr.changed_files == 0
            );
        }
    }
}
