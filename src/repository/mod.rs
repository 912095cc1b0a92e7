mod database;
mod history;

pub use database::{Database, FeatureRecord, MethodRecord, RunRecords};
pub use history::{
    CommitInfo, FeatureStore, HistoryError, HistoryWalker, NoopProgress, Pipeline, ProgressHandle,
    ProgressReporter, SnapshotCtx, SnapshotStats, TerminalProgress,
};

/// Bumped whenever the stored layout or feature semantics change
pub const SCHEMA_VERSION: &str = "2";
