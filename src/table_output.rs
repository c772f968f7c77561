//! Human-readable table output for outlier reports

use crate::classifier::{outliers_by_recency, OutlierResult};

const WIDTH: usize = 150;

/// Table formatter over one detection run
#[derive(Debug)]
pub struct TableOutput<'a> {
    outliers: Vec<&'a OutlierResult>,
    total: usize,
}

/// First `max` characters of `s`
fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn format_features(result: &OutlierResult) -> String {
    let joined = result
        .outlier_features
        .iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.chars().count() > 28 {
        format!("{}...", truncate(&joined, 25))
    } else {
        joined
    }
}

impl<'a> TableOutput<'a> {
    pub fn new(results: &'a [OutlierResult]) -> Self {
        Self {
            outliers: outliers_by_recency(results),
            total: results.len(),
        }
    }

    fn format_row(result: &OutlierResult) -> String {
        let merged = result
            .merged_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "#{:<7} {:<12} {:<20} {:<10.2} {:<30} {}",
            result.pr_number,
            merged,
            truncate(&result.author, 18),
            result.max_abs_z_score,
            format_features(result),
            truncate(&result.title, 68)
        )
    }

    pub fn to_table(&self) -> String {
        if self.outliers.is_empty() {
            return format!("No outliers detected out of {} PRs analyzed.", self.total);
        }

        let mut lines = vec![
            String::new(),
            "Outlier Pull Requests (ordered by most recently merged)".to_string(),
            "=".repeat(WIDTH),
            format!(
                "{:<8} {:<12} {:<20} {:<10} {:<30} {:<70}",
                "PR #", "Merged", "Author", "Max |Z|", "Outlier Features", "Title"
            ),
            "-".repeat(WIDTH),
        ];

        lines.extend(self.outliers.iter().map(|r| Self::format_row(r)));

        lines.push("-".repeat(WIDTH));
        lines.push(format!(
            "Total outliers: {} out of {} PRs ({:.1}%)",
            self.outliers.len(),
            self.total,
            self.outliers.len() as f64 / self.total as f64 * 100.0
        ));

        lines.join("\n")
    }
}
