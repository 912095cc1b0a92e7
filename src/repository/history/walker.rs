//! Commit enumeration on top of gix

use gix::ObjectId;
use std::path::Path;

use crate::config::CommitRange;

use super::snapshot::SnapshotCtx;
use super::types::HistoryError;

/// Read-only access to one repository's history
pub struct HistoryWalker {
    repo: gix::Repository,
}

impl HistoryWalker {
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let repo = gix::open(path).map_err(|e| HistoryError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Commit at the tip of `branch`, or HEAD when no branch is given
    pub fn tip(&self, branch: Option<&str>) -> Result<ObjectId, HistoryError> {
        match branch {
            None => self
                .repo
                .head_id()
                .map(|id| id.detach())
                .map_err(|e| HistoryError::Walk(e.to_string())),
            Some(name) => {
                let full_name = format!("refs/heads/{}", name);
                let mut reference = self
                    .repo
                    .find_reference(full_name.as_str())
                    .map_err(|_| HistoryError::BranchNotFound(name.to_string()))?;
                reference
                    .peel_to_id_in_place()
                    .map(|id| id.detach())
                    .map_err(|e| HistoryError::Walk(e.to_string()))
            }
        }
    }

    /// Every commit reachable from `tip`, oldest first
    pub fn collect_commits(&self, tip: ObjectId) -> Result<Vec<ObjectId>, HistoryError> {
        let mut commits: Vec<ObjectId> = Vec::new();
        let walk = self.repo.rev_walk([tip]);
        for info in walk.all().map_err(|e| HistoryError::Walk(e.to_string()))? {
            let info = info.map_err(|e| HistoryError::Walk(e.to_string()))?;
            commits.push(info.id);
        }
        commits.reverse();
        Ok(commits)
    }

    /// Commits of `branch` restricted to `range`, oldest first
    pub fn plan(
        &self,
        branch: Option<&str>,
        range: Option<CommitRange>,
    ) -> Result<(ObjectId, Vec<ObjectId>), HistoryError> {
        let tip = self.tip(branch)?;
        let all = self.collect_commits(tip)?;
        let commits = match range {
            Some(r) => r.slice(&all).to_vec(),
            None => all,
        };
        Ok((tip, commits))
    }

    /// Snapshot builder over this repository's object database
    pub fn snapshots(
        &self,
        extensions: &[String],
        max_file_bytes: Option<u64>,
    ) -> SnapshotCtx<'_, gix::OdbHandle> {
        SnapshotCtx::new(&self.repo.objects, extensions, max_file_bytes)
    }
}
