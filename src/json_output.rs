//! JSON output format for outlier reports

use crate::classifier::{outliers_by_recency, OutlierResult};
use crate::metric::{Metric, ZScores};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single flagged pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutlier {
    pub pr_number: u64,
    pub title: String,
    pub author: String,
    /// RFC 3339 with a `+00:00` offset, as in the CSV output
    #[serde(serialize_with = "serialize_rfc3339")]
    pub merged_at: Option<DateTime<Utc>>,
    pub is_outlier: bool,
    pub max_abs_z_score: f64,
    pub outlier_features: Vec<Metric>,
    /// Computed z-scores only; null metrics are omitted
    pub z_scores: ZScores,
}

fn serialize_rfc3339<S: serde::Serializer>(
    time: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(t) => serializer.serialize_some(&t.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

impl From<&OutlierResult> for JsonOutlier {
    fn from(r: &OutlierResult) -> Self {
        Self {
            pr_number: r.pr_number,
            title: r.title.clone(),
            author: r.author.clone(),
            merged_at: r.merged_at,
            is_outlier: r.is_outlier,
            max_abs_z_score: r.max_abs_z_score,
            outlier_features: r.outlier_features.clone(),
            z_scores: r.z_scores,
        }
    }
}

/// Root JSON output: an array of outliers, most recently merged first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonOutput {
    pub outliers: Vec<JsonOutlier>,
}

impl JsonOutput {
    pub fn new(results: &[OutlierResult]) -> Self {
        Self {
            outliers: outliers_by_recency(results)
                .into_iter()
                .map(JsonOutlier::from)
                .collect(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(number: u64, is_outlier: bool) -> OutlierResult {
        let mut z_scores = ZScores::default();
        z_scores.set(Metric::Additions, Some(4.5));
        z_scores.set(Metric::Deletions, Some(-0.25));
        OutlierResult {
            pr_id: number,
            pr_number: number,
            title: format!("PR {}", number),
            author: "octocat".to_string(),
            merged_at: Some(Utc.with_ymd_and_hms(2024, 2, number as u32, 8, 0, 0).unwrap()),
            is_outlier,
            outlier_features: vec![Metric::Additions],
            max_abs_z_score: 4.5,
            z_scores,
        }
    }

    #[test]
    fn test_json_is_array_of_outliers() {
        let results = vec![result(1, true), result(2, false), result(3, true)];
        let json = JsonOutput::new(&results).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["pr_number"], 3);
        assert_eq!(arr[1]["pr_number"], 1);
        assert_eq!(arr[0]["outlier_features"][0], "additions");
        assert_eq!(arr[0]["merged_at"], "2024-02-03T08:00:00+00:00");
    }

    #[test]
    fn test_merged_at_matches_csv_format() {
        let r = result(4, true);
        let json = serde_json::to_value(JsonOutlier::from(&r)).unwrap();
        let csv = crate::csv_output::CsvOutput::new(std::slice::from_ref(&r)).to_csv();
        let rfc3339 = r.merged_at.unwrap().to_rfc3339();

        assert_eq!(json["merged_at"], rfc3339.as_str());
        assert!(csv.contains(&format!("4,{},", rfc3339)));

        let mut unmerged = r.clone();
        unmerged.merged_at = None;
        let json = serde_json::to_value(JsonOutlier::from(&unmerged)).unwrap();
        assert!(json["merged_at"].is_null());
    }

    #[test]
    fn test_null_zscores_omitted() {
        let json = JsonOutput::new(&[result(1, true)]).to_json().unwrap();
        assert!(json.contains("\"z_additions\": 4.5"));
        assert!(json.contains("\"z_deletions\": -0.25"));
        assert!(!json.contains("z_comment_density_per_file"));
    }

    #[test]
    fn test_empty_report() {
        let json = JsonOutput::new(&[result(1, false)]).to_json().unwrap();
        assert_eq!(json, "[]");
    }
}
