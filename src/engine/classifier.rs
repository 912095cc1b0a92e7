//! Per-commit change classification

use rustc_hash::FxHashMap;

use crate::model::{MethodId, MethodStatus};

use super::differ::code_changed;
use super::snapshots::SnapshotTable;

/// Status of one observed method: first-commit flag, then previous presence, then diff
pub fn classify(first_commit: bool, old: Option<&[String]>, new: &[String]) -> MethodStatus {
    if first_commit {
        return MethodStatus::Unknown;
    }
    match old {
        None => MethodStatus::Added,
        Some(old) if code_changed(Some(old), Some(new)) => MethodStatus::Modified,
        Some(_) => MethodStatus::NoChange,
    }
}

/// Holds the statuses produced during one commit cycle.
///
/// Read-only to collectors; only the aggregator drives it.
#[derive(Debug, Default)]
pub struct ChangeClassifier {
    statuses: FxHashMap<MethodId, MethodStatus>,
}

impl ChangeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous cycle's statuses
    pub fn begin_commit(&mut self) {
        self.statuses.clear();
    }

    pub fn observe(
        &mut self,
        first_commit: bool,
        id: MethodId,
        old: Option<&[String]>,
        new: &[String],
    ) -> MethodStatus {
        let status = classify(first_commit, old, new);
        self.statuses.insert(id, status);
        status
    }

    /// Mark every id carried over from the previous commit but unseen now as deleted
    pub fn flush(&mut self, previous: &SnapshotTable, current: &SnapshotTable) -> Vec<MethodId> {
        let deleted: Vec<MethodId> = previous.ids().filter(|id| !current.contains(*id)).collect();
        for id in &deleted {
            self.statuses.insert(*id, MethodStatus::Deleted);
        }
        deleted
    }

    pub fn status(&self, id: MethodId) -> Option<MethodStatus> {
        self.statuses.get(&id).copied()
    }

    pub fn statuses(&self) -> &FxHashMap<MethodId, MethodStatus> {
        &self.statuses
    }
}
