use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use prscope::cli::{self, Cli, Command, DetectArgs, IngestArgs, ScoresArgs};
use prscope::config::AnalysisConfig;
use prscope::ingest::{self, DateRange};
use prscope::pipeline;
use prscope::repo_ref::RepositoryRef;
use prscope::store::{MemoryStore, Store};
use prscope::OutlierError;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; RUST_LOG applies, --verbose raises to DEBUG
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(db: &Path) -> Result<MemoryStore> {
    MemoryStore::open(db).with_context(|| format!("Failed to open store {}", db.display()))
}

fn save_store(store: &MemoryStore, db: &Path) -> Result<()> {
    store
        .save(db)
        .with_context(|| format!("Failed to write store {}", db.display()))
}

fn run_ingest(db: &Path, args: IngestArgs) -> Result<()> {
    let repo = RepositoryRef::parse(&args.repository)?;
    let range = DateRange::parse(args.start.as_deref(), args.end.as_deref())?;
    let mut store = open_store(db)?;

    if args.reset_db {
        store.clear()?;
        eprintln!("Database reset complete.");
    }

    eprintln!("Loading pull requests for {}...", repo);
    let summary = ingest::ingest_file(&mut store, &repo, &args.input, range)
        .with_context(|| format!("Failed to ingest {}", args.input.display()))?;
    save_store(&store, db)?;

    println!(
        "Saved {} of {} PRs for {}.",
        summary.saved, summary.read, repo
    );
    Ok(())
}

fn run_detect(db: &Path, args: DetectArgs) -> Result<()> {
    let repo = RepositoryRef::parse(&args.repository)?;
    let repository = repo.full_name();

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    }
    .with_overrides(args.min_samples, args.threshold);

    tracing::debug!(
        repository = %repository,
        threshold = config.threshold,
        min_sample_size = config.min_sample_size,
        "detecting outliers"
    );

    let mut store = open_store(db)?;
    let detection = match pipeline::analyze_repository(&mut store, &repository, &config, Utc::now())
    {
        Ok(detection) => detection,
        Err(e @ OutlierError::InsufficientData { .. }) => {
            eprintln!(
                "Repository {} does not have enough merged PRs for analysis.",
                repository
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    save_store(&store, db)?;

    let degraded = detection.baseline.degraded_metrics();
    if !degraded.is_empty() {
        tracing::info!(
            "metrics without enough samples (never flagged): {}",
            degraded
                .iter()
                .map(|m| m.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    println!("{}", cli::render(&detection.results, args.format)?);
    Ok(())
}

fn run_scores(db: &Path, args: ScoresArgs) -> Result<()> {
    let repo = RepositoryRef::parse(&args.repository)?;
    let store = open_store(db)?;

    let mut results = Vec::new();
    for score in store.outlier_scores(&repo.full_name(), false)? {
        let Some(pr) = store.pull_request(score.pull_request_id)? else {
            tracing::warn!(id = score.pull_request_id, "score without pull request, skipping");
            continue;
        };
        results.push(score.to_result(&pr));
    }

    println!("{}", cli::render(&results, args.format)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.verbose);

    match args.command {
        Command::Ingest(ingest_args) => run_ingest(&args.db, ingest_args),
        Command::Detect(detect_args) => run_detect(&args.db, detect_args),
        Command::Scores(scores_args) => run_scores(&args.db, scores_args),
    }
}
