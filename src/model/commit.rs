use std::sync::Arc;

use gix::ObjectId;

/// One source file as seen by a commit
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: String,
    /// Blob id of the new content, used to reuse parse results across commits
    pub blob: Option<ObjectId>,
    /// New content as lines, `None` when the file was deleted
    pub lines: Option<Arc<[String]>>,
}

impl FileChange {
    pub fn new(path: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            blob: None,
            lines: Some(lines.into()),
        }
    }

    pub fn with_blob(path: impl Into<String>, blob: ObjectId, lines: Arc<[String]>) -> Self {
        Self {
            path: path.into(),
            blob: Some(blob),
            lines: Some(lines),
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            blob: None,
            lines: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.lines.is_none()
    }
}

/// A commit as delivered by the history walker, oldest first
#[derive(Debug, Clone)]
pub struct CommitSnapshot {
    pub oid: ObjectId,
    pub author: String,
    pub committer: String,
    pub committer_timestamp: i64,
    pub files: Vec<FileChange>,
}

impl CommitSnapshot {
    /// Total number of content lines carried by this commit
    pub fn line_count(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.lines.as_ref())
            .map(|l| l.len())
            .sum()
    }
}
