//! Git history pipeline
//!
//! Walks a repository's history oldest first and feeds every commit through
//! the method aggregator.
//!
//! # Architecture
//!
//! - **types**: commit header, `HistoryError`, snapshot counters
//! - **walker**: tip resolution and revision walk on top of gix
//! - **snapshot**: per-commit source file sets with content reuse
//! - **progress**: progress reporting abstraction
//! - **store**: persistence layer trait
//! - **db_store**: database implementation of FeatureStore
//! - **Pipeline**: main orchestrator

mod db_store;
mod progress;
mod snapshot;
mod store;
mod types;
mod walker;

pub use progress::{NoopProgress, ProgressHandle, ProgressReporter, TerminalProgress};
pub use snapshot::SnapshotCtx;
pub use store::FeatureStore;
pub use types::{CommitInfo, HistoryError, SnapshotStats};
pub use walker::HistoryWalker;

use anyhow::{Context, Result};
use gix::ObjectId;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, RunPlan};
use crate::engine::{CollectorFactory, MethodsAggregator};
use crate::engine::collectors::default_collectors;
use crate::model::FeatureMatrix;
use crate::parse::JavaParser;
use crate::util::{format_age, format_timestamp};

/// Turns a repository's history into per-method feature matrices
pub struct Pipeline {
    repo_path: PathBuf,
    config: PipelineConfig,
    verbose: bool,
    profile: bool,
}

impl Pipeline {
    pub fn new(repo_path: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            repo_path: repo_path.into(),
            config,
            verbose: true,
            profile: false,
        }
    }

    /// No logging or progress output, used by tests and benchmarks
    pub fn quiet(repo_path: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            verbose: false,
            ..Self::new(repo_path, config)
        }
    }

    /// Detailed per-phase timing output
    pub fn profiling(repo_path: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            profile: true,
            ..Self::new(repo_path, config)
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one plan with a fresh run context, using store for caching
    pub async fn run(&self, store: &impl FeatureStore, plan: &RunPlan) -> Result<FeatureMatrix> {
        let total_start = Instant::now();
        let progress: Box<dyn ProgressReporter> = if self.profile {
            Box::new(NoopProgress)
        } else {
            Box::new(TerminalProgress::new(self.verbose))
        };

        // Phase 1: Open repository and resolve the tip
        self.log(&format!("Opening repository at {}...", self.repo_path.display()));
        let phase_start = Instant::now();
        let walker = HistoryWalker::open(&self.repo_path)?;
        let tip = walker.tip(self.config.branch.as_deref())?;
        let tip_hex = tip.to_hex().to_string();
        self.profile_phase("Open repo + resolve tip", phase_start);

        // Phase 2: Check cache
        let run_key = format!(
            "{}|{}|{}",
            tip_hex,
            plan.fingerprint(),
            self.config.fingerprint()
        );
        if store.get_run_key(&plan.label).await.as_deref() == Some(run_key.as_str()) {
            self.log(&format!(
                "{} is up to date (tip: {}), loading from cache...",
                plan.label,
                &tip_hex[..8]
            ));
            return store.load_run(&plan.label).await;
        }

        // Phase 3: Collect commits via revwalk
        let phase_start = Instant::now();
        let all_commits = walker.collect_commits(tip)?;
        let commits = match plan.range {
            Some(range) => range.slice(&all_commits),
            None => &all_commits[..],
        };
        self.profile_phase(
            &format!(
                "Revwalk ({} of {} commits planned)",
                commits.len(),
                all_commits.len()
            ),
            phase_start,
        );
        self.log(&format!(
            "{}: {} commits to process",
            plan.label,
            commits.len()
        ));

        // Phase 4: Feed commits through the aggregator
        let phase_start = Instant::now();
        let matrix = self
            .extract(&walker, commits, progress.as_ref())
            .with_context(|| format!("Failed to extract features for {}", plan.label))?;
        self.profile_phase(
            &format!("Extract ({} methods)", matrix.len()),
            phase_start,
        );

        // Phase 5: Persist
        let phase_start = Instant::now();
        store
            .save_run(&plan.label, &run_key, &matrix, progress.as_ref())
            .await?;
        self.profile_phase("Save run", phase_start);

        if self.profile {
            info!("[PROFILE] TOTAL {}: {:?}", plan.label, total_start.elapsed());
        }

        Ok(matrix)
    }

    /// Features per commit author over the plan's commits, never cached
    pub fn run_by_author(&self, plan: &RunPlan) -> Result<BTreeMap<String, FeatureMatrix>> {
        let progress = TerminalProgress::new(self.verbose && !self.profile);
        let walker = HistoryWalker::open(&self.repo_path)?;
        let (_, commits) = walker.plan(self.config.branch.as_deref(), plan.range)?;
        self.log(&format!(
            "{}: {} commits to split by author",
            plan.label,
            commits.len()
        ));

        let capacity = self.config.history_capacity;
        let factory: CollectorFactory = Box::new(move || default_collectors(capacity));
        let mut aggregator = self.aggregator()?.with_author_collectors(factory);
        self.walk(&walker, &commits, &progress, &mut aggregator);

        let by_author = aggregator.finish_by_author();
        self.log(&format!("{}: {} authors", plan.label, by_author.len()));
        Ok(by_author)
    }

    /// Process `commits` in order; unreadable or over-large commits are skipped
    pub fn extract(
        &self,
        walker: &HistoryWalker,
        commits: &[ObjectId],
        progress: &dyn ProgressReporter,
    ) -> Result<FeatureMatrix> {
        let mut aggregator = self.aggregator()?;
        self.walk(walker, commits, progress, &mut aggregator);
        Ok(aggregator.finish())
    }

    fn aggregator(&self) -> Result<MethodsAggregator<JavaParser>> {
        let parser = JavaParser::with_extensions(&self.config.extensions)?;
        Ok(
            MethodsAggregator::new(parser, default_collectors(self.config.history_capacity))
                .with_max_files(self.config.max_files_per_commit),
        )
    }

    fn walk(
        &self,
        walker: &HistoryWalker,
        commits: &[ObjectId],
        progress: &dyn ProgressReporter,
        aggregator: &mut MethodsAggregator<JavaParser>,
    ) {
        let mut snapshots =
            walker.snapshots(&self.config.extensions, self.config.max_file_bytes);

        let pb = progress.start("Walking", commits.len() as u64);
        let mut skipped = 0usize;
        let mut span: Option<(i64, i64)> = None;

        for oid in commits {
            pb.inc(1);
            pb.set_message(&oid.to_hex_with_len(8).to_string());

            let snapshot = match snapshots.snapshot(*oid) {
                Ok(s) => s,
                Err(err) => {
                    warn!(commit = %oid, error = %err, "skipping unreadable commit");
                    skipped += 1;
                    continue;
                }
            };

            match aggregator.process_commit(&snapshot) {
                Ok(report) => {
                    let ts = snapshot.committer_timestamp;
                    span = Some(span.map_or((ts, ts), |(first, _)| (first, ts)));
                    debug!(
                        commit = %oid,
                        index = report.index,
                        methods = report.methods,
                        added = report.added,
                        modified = report.modified,
                        deleted = report.deleted,
                        "processed commit"
                    );
                }
                Err(err) => {
                    warn!(commit = %oid, error = %err, "skipping commit");
                    skipped += 1;
                }
            }
        }

        pb.finish();

        if self.profile {
            let stats = snapshots.stats();
            info!(
                "[PROFILE] Trees visited: {}, blobs read: {}, blobs reused: {}, oversized: {}",
                stats.trees_visited, stats.blobs_read, stats.blobs_reused, stats.oversized
            );
        }
        if let Some((first, last)) = span {
            self.log(&format!(
                "Processed {} commits ({} .. {}, {}), {} skipped",
                aggregator.commit_index(),
                format_timestamp(first),
                format_timestamp(last),
                format_age(last - first),
                skipped
            ));
        }
    }

    fn log(&self, msg: &str) {
        if self.verbose {
            info!("{}", msg);
        }
    }

    fn profile_phase(&self, name: &str, start: Instant) {
        if self.profile {
            info!("[PROFILE] {}: {:?}", name, start.elapsed());
        }
    }
}
