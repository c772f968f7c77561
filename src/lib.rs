//! prscope - Pull-request review outlier detection
//!
//! This library computes engineered features for pull requests, builds
//! per-repository baselines (mean and sample standard deviation for nine
//! metrics) and flags PRs whose z-score on any metric exceeds a threshold.

pub mod baseline;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod features;
pub mod ingest;
pub mod json_output;
pub mod metric;
pub mod pipeline;
pub mod record;
pub mod repo_ref;
pub mod stats;
pub mod store;
pub mod table_output;

pub use baseline::{MetricBaseline, RepositoryBaseline};
pub use classifier::{classify, detect_outliers, Detection, OutlierResult};
pub use config::AnalysisConfig;
pub use error::{OutlierError, Result};
pub use features::{compute_features, EngineeredFeatures};
pub use metric::{Metric, ZScores};
pub use record::{PrId, PrState, PullRequestRecord};
