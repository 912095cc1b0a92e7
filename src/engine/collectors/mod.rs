//! Per-method accumulators
//!
//! Every collector receives one `MethodEvent` per observed method and commit.
//! Collectors that keep commit-scoped state additionally expose a
//! `CommitBoundary`, flushed by the aggregator once all files of a commit were
//! dispatched.

mod fading;
mod latest_changes;
mod length;
mod ratios;
mod signature_id;
mod since_last_change;
mod time_of_change;

pub use fading::FadingSimilarity;
pub use latest_changes::{CurrentStatus, LatestChanges, LatestChangesSummary};
pub use length::MethodLength;
pub use ratios::{ChangeRatio, ExistenceRatio};
pub use signature_id::SignatureId;
pub use since_last_change::CommitsSinceLastChange;
pub use time_of_change::{LatestChangeTimes, TimeSinceLastChange};

use rustc_hash::FxHashMap;

use crate::model::{CollectorOutput, MethodId, MethodSnapshot, MethodStatus};

/// The commit currently being processed
#[derive(Debug, Clone, Copy)]
pub struct CommitContext<'a> {
    /// 0-based position among processed commits
    pub index: usize,
    /// Processed commits including this one
    pub commits_processed: usize,
    pub timestamp: i64,
    pub author: &'a str,
    pub first_commit: bool,
}

/// One method observed in the current commit
#[derive(Debug, Clone, Copy)]
pub struct MethodEvent<'a> {
    pub id: MethodId,
    /// Run-scoped id of the file-independent normalized signature
    pub signature_id: u32,
    pub status: MethodStatus,
    pub new: &'a MethodSnapshot,
    pub old: Option<&'a MethodSnapshot>,
}

impl MethodEvent<'_> {
    pub fn new_lines(&self) -> &[String] {
        &self.new.lines
    }

    pub fn old_lines(&self) -> Option<&[String]> {
        self.old.map(|s| &s.lines[..])
    }
}

/// State handed to collectors at the commit boundary
#[derive(Debug, Clone, Copy)]
pub struct BoundaryEvent<'a> {
    /// Final statuses of this commit, deletions included
    pub statuses: &'a FxHashMap<MethodId, MethodStatus>,
    pub deleted: &'a [MethodId],
}

/// A feature accumulator over the method event stream
pub trait MethodCollector {
    fn name(&self) -> &'static str;

    /// Column names of this collector's output, in splice order
    fn columns(&self) -> Vec<String> {
        vec![self.name().to_string()]
    }

    fn collect(&mut self, ctx: &CommitContext<'_>, event: &MethodEvent<'_>);

    /// Current output for an id, `None` if the id was never observed
    fn value(&self, id: MethodId) -> Option<CollectorOutput>;

    /// Commit-boundary capability, if this collector has commit-scoped state
    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        None
    }
}

/// Capability of finalizing commit-scoped state
pub trait CommitBoundary {
    fn flush(&mut self, ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>);
}

/// The default feature set, `capacity` being the bounded history length
pub fn default_collectors(capacity: usize) -> Vec<Box<dyn MethodCollector>> {
    vec![
        Box::new(SignatureId::new()),
        Box::new(CommitsSinceLastChange::new()),
        Box::new(FadingSimilarity::new()),
        Box::new(TimeSinceLastChange::new()),
        Box::new(LatestChangesSummary::new(capacity)),
        Box::new(ChangeRatio::new()),
        Box::new(ExistenceRatio::new()),
        Box::new(MethodLength::new()),
        Box::new(LatestChanges::new(capacity)),
        Box::new(LatestChangeTimes::new(capacity)),
    ]
}

fn list_columns(name: &str, capacity: usize) -> Vec<String> {
    (0..capacity).map(|i| format!("{}[{}]", name, i)).collect()
}
