//! CLI argument parsing for prscope

use crate::classifier::OutlierResult;
use crate::csv_output::CsvOutput;
use crate::json_output::JsonOutput;
use crate::table_output::TableOutput;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for outlier reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Table,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// Render results; only outliers are listed
pub fn render(results: &[OutlierResult], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Table => TableOutput::new(results).to_table(),
        OutputFormat::Json => JsonOutput::new(results).to_json()?,
        OutputFormat::Csv => CsvOutput::new(results).to_csv(),
    })
}

#[derive(Parser, Debug)]
#[command(name = "prscope")]
#[command(version)]
#[command(about = "Identify pull-request review outliers using z-score analysis", long_about = None)]
pub struct Cli {
    /// Snapshot file holding pull requests, features and scores
    #[arg(long = "db", value_name = "FILE", default_value = "prscope.json", global = true)]
    pub db: PathBuf,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load pull requests from a hosting-API export into the store
    Ingest(IngestArgs),
    /// Compute features, detect outliers and store their scores
    Detect(DetectArgs),
    /// Show the outliers stored by the last detect run
    Scores(ScoresArgs),
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Repository (owner/repo or GitHub URL)
    pub repository: String,

    /// JSON export of the repository's pull requests
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Keep PRs created on or after this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub start: Option<String>,

    /// Keep PRs created on or before this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub end: Option<String>,

    /// Delete all stored data before ingesting
    #[arg(long = "reset-db")]
    pub reset_db: bool,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Repository (owner/repo or GitHub URL)
    pub repository: String,

    /// Z-score threshold for outliers (default: 2.0)
    #[arg(short, long, value_name = "SIGMA")]
    pub threshold: Option<f64>,

    /// Minimum number of merged PRs required (default: 30)
    #[arg(long = "min-samples", value_name = "N")]
    pub min_samples: Option<usize>,

    /// TOML file with analysis settings; flags override it
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ScoresArgs {
    /// Repository (owner/repo or GitHub URL)
    pub repository: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_detect_defaults() {
        let cli = Cli::parse_from(["prscope", "detect", "acme/widgets"]);
        assert_eq!(cli.db, PathBuf::from("prscope.json"));
        assert!(!cli.verbose);
        match cli.command {
            Command::Detect(args) => {
                assert_eq!(args.repository, "acme/widgets");
                assert_eq!(args.threshold, None);
                assert_eq!(args.min_samples, None);
                assert_eq!(args.format, OutputFormat::Table);
            }
            other => panic!("Expected detect, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_detect_custom() {
        let cli = Cli::parse_from([
            "prscope",
            "detect",
            "acme/widgets",
            "-t",
            "2.5",
            "--min-samples",
            "10",
            "--format",
            "csv",
            "--db",
            "other.json",
        ]);
        assert_eq!(cli.db, PathBuf::from("other.json"));
        match cli.command {
            Command::Detect(args) => {
                assert_eq!(args.threshold, Some(2.5));
                assert_eq!(args.min_samples, Some(10));
                assert_eq!(args.format, OutputFormat::Csv);
            }
            other => panic!("Expected detect, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_ingest() {
        let cli = Cli::parse_from([
            "prscope",
            "-v",
            "ingest",
            "https://github.com/acme/widgets",
            "--input",
            "prs.json",
            "--start",
            "2024-01-01",
            "--reset-db",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.input, PathBuf::from("prs.json"));
                assert_eq!(args.start.as_deref(), Some("2024-01-01"));
                assert_eq!(args.end, None);
                assert!(args.reset_db);
            }
            other => panic!("Expected ingest, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_scores_format() {
        let cli = Cli::parse_from(["prscope", "scores", "acme/widgets", "-f", "json"]);
        match cli.command {
            Command::Scores(args) => {
                assert_eq!(args.repository, "acme/widgets");
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("Expected scores, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["prscope"]).is_err());
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(
            render(&[], OutputFormat::Table).unwrap(),
            "No outliers detected out of 0 PRs analyzed."
        );
    }
}
