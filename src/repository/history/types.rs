//! Domain types for history walking

use gix::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Header fields of a commit being snapshotted
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub oid: ObjectId,
    pub tree: ObjectId,
    pub author: String,
    pub committer: String,
    /// Committer time, seconds since the epoch
    pub timestamp: i64,
}

/// Failures of the history source
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to open git repository at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// Fatal: nothing can be walked
    #[error("branch '{0}' does not exist")]
    BranchNotFound(String),

    #[error("failed to walk history: {0}")]
    Walk(String),

    /// A single commit, tree or blob could not be read
    #[error("failed to read object {oid}: {reason}")]
    Object { oid: ObjectId, reason: String },
}

/// Counters gathered while snapshotting, reported in profile mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub commits: usize,
    pub trees_visited: usize,
    pub blobs_read: usize,
    pub blobs_reused: usize,
    pub oversized: usize,
}
