//! CSV output format for outlier reports

use crate::classifier::{outliers_by_recency, OutlierResult};

/// CSV header row
pub const HEADER: &str = "pr_number,merged_at,author,title,max_abs_z_score,outlier_features";

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput<'a> {
    outliers: Vec<&'a OutlierResult>,
}

impl<'a> CsvOutput<'a> {
    /// Keeps only the outliers, most recently merged first
    pub fn new(results: &'a [OutlierResult]) -> Self {
        Self {
            outliers: outliers_by_recency(results),
        }
    }

    /// Escape CSV field (handle commas, quotes, line breaks)
    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(result: &OutlierResult) -> String {
        let merged_at = result
            .merged_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let features: Vec<&str> = result.outlier_features.iter().map(|m| m.name()).collect();

        [
            result.pr_number.to_string(),
            merged_at,
            Self::escape_field(&result.author),
            Self::escape_field(&result.title),
            format!("{:.4}", result.max_abs_z_score),
            features.join(";"),
        ]
        .join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(HEADER);
        output.push('\n');

        for result in &self.outliers {
            output.push_str(&Self::format_row(result));
            output.push('\n');
        }

        output
    }
}
