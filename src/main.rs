mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};
use methodtrail::config::RunPlan;
use methodtrail::model::FeatureMatrix;
use methodtrail::repository::{Database, HistoryError, Pipeline};
use methodtrail::util::file_slug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let db = open_database(&cli).await?;

    let config = cli.pipeline_config();
    let pipeline = if cli.profile {
        Pipeline::profiling(&cli.repo_path, config)
    } else {
        Pipeline::new(&cli.repo_path, config)
    };

    let plans: Vec<RunPlan> = match cli.window_size {
        Some(size) => RunPlan::windows(size, cli.windows, cli.result_gap)
            .into_iter()
            .flat_map(|(test, result)| [test, result])
            .collect(),
        None => vec![RunPlan::full("features")],
    };
    if plans.is_empty() {
        warn!(
            "Window size {} leaves no commits once the gap of {} is removed",
            cli.window_size.unwrap_or_default(),
            cli.result_gap
        );
    }

    for plan in &plans {
        match pipeline.run(&db, plan).await {
            Ok(matrix) => {
                let path = write_output(&matrix, &cli.destination, &plan.label, cli.format)?;
                info!("Wrote {} methods to {}", matrix.len(), path.display());
            }
            Err(err) if is_fatal(&err) || cli.window_size.is_none() => return Err(err),
            Err(err) => {
                error!("{} failed: {:#}", plan.label, err);
                continue;
            }
        }

        if !cli.by_author {
            continue;
        }
        match pipeline.run_by_author(plan) {
            Ok(by_author) => {
                let dir = cli.destination.join(format!("{}.authors", plan.label));
                for (author, matrix) in &by_author {
                    write_output(matrix, &dir, &file_slug(author), cli.format)?;
                }
                info!("Wrote {} author files to {}", by_author.len(), dir.display());
            }
            Err(err) if is_fatal(&err) || cli.window_size.is_none() => return Err(err),
            Err(err) => error!("{} failed: {:#}", plan.label, err),
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "methodtrail=debug" } else { "methodtrail=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Errors after which no further window can succeed
fn is_fatal(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<HistoryError>(),
        Some(HistoryError::BranchNotFound(_) | HistoryError::Open { .. })
    )
}

async fn open_database(cli: &Cli) -> Result<Database> {
    let db = if cli.no_cache {
        Database::in_memory().await?
    } else {
        let db_path = match &cli.database {
            Some(path) => path.clone(),
            None => default_database_path(&cli.repo_path)?,
        };
        info!("Using feature cache: {}", db_path.display());
        let db_path_str = db_path.to_str().context("Invalid path encoding")?;
        Database::new(db_path_str).await?
    };
    db.init_schema().await?;
    Ok(db)
}

/// `<cache dir>/methodtrail/<repo name>_<hash of absolute path>.db`
fn default_database_path(repo_path: &Path) -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("methodtrail");
    fs::create_dir_all(&cache_dir)?;

    let abs_repo_path = fs::canonicalize(repo_path)
        .with_context(|| format!("Could not resolve path: {}", repo_path.display()))?;
    let repo_name = abs_repo_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo");
    let mut hasher = DefaultHasher::new();
    abs_repo_path.hash(&mut hasher);
    let hash = hasher.finish();
    Ok(cache_dir.join(format!("{}_{:016x}.db", repo_name, hash)))
}

fn write_output(
    matrix: &FeatureMatrix,
    destination: &Path,
    label: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    match format {
        OutputFormat::Text => {
            matrix.write_commit_sizes(destination, label)?;
            matrix.write_text(destination, label)
        }
        OutputFormat::Json => matrix.write_json(destination, label),
    }
}
