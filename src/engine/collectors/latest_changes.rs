use rustc_hash::FxHashMap;

use crate::engine::history::BoundedHistory;
use crate::model::{CollectorOutput, FeatureValue, HISTORY_SENTINEL, MethodId, MethodStatus};

use super::{
    BoundaryEvent, CommitBoundary, CommitContext, MethodCollector, MethodEvent, list_columns,
};

/// Per-id ring buffers of classifier output, appended at every flush
struct StatusHistories {
    capacity: usize,
    histories: FxHashMap<MethodId, BoundedHistory<MethodStatus>>,
}

impl StatusHistories {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            histories: FxHashMap::default(),
        }
    }

    fn track(&mut self, id: MethodId) {
        let capacity = self.capacity;
        self.histories
            .entry(id)
            .or_insert_with(|| BoundedHistory::new(capacity));
    }

    fn record(&mut self, statuses: &FxHashMap<MethodId, MethodStatus>) {
        for (id, status) in statuses {
            if let Some(history) = self.histories.get_mut(id) {
                history.push(*status);
            }
        }
    }

    fn get(&self, id: MethodId) -> Option<&BoundedHistory<MethodStatus>> {
        self.histories.get(&id)
    }
}

/// The last N statuses of each method as codes, `-1` padded
pub struct LatestChanges {
    inner: StatusHistories,
}

impl LatestChanges {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: StatusHistories::new(capacity),
        }
    }
}

impl MethodCollector for LatestChanges {
    fn name(&self) -> &'static str {
        "change"
    }

    fn columns(&self) -> Vec<String> {
        list_columns(self.name(), self.inner.capacity)
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        self.inner.track(event.id);
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        let codes = self.inner.get(id)?.map(|s| s.code());
        Some(CollectorOutput::List(
            codes
                .padded(HISTORY_SENTINEL)
                .into_iter()
                .map(FeatureValue::Int)
                .collect(),
        ))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for LatestChanges {
    fn flush(&mut self, _ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        self.inner.record(boundary.statuses);
    }
}

/// Whether the method was added, modified or deleted within the last N commits
pub struct LatestChangesSummary {
    inner: StatusHistories,
}

impl LatestChangesSummary {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: StatusHistories::new(capacity),
        }
    }
}

impl MethodCollector for LatestChangesSummary {
    fn name(&self) -> &'static str {
        "recent"
    }

    fn columns(&self) -> Vec<String> {
        vec![
            "recently_added".to_string(),
            "recently_modified".to_string(),
            "recently_deleted".to_string(),
        ]
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        self.inner.track(event.id);
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        let history = self.inner.get(id)?;
        Some(CollectorOutput::List(vec![
            FeatureValue::Bool(history.contains(&MethodStatus::Added)),
            FeatureValue::Bool(history.contains(&MethodStatus::Modified)),
            FeatureValue::Bool(history.contains(&MethodStatus::Deleted)),
        ]))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for LatestChangesSummary {
    fn flush(&mut self, _ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        self.inner.record(boundary.statuses);
    }
}

/// Status code of the method at the latest commit it was classified in
#[derive(Default)]
pub struct CurrentStatus {
    statuses: FxHashMap<MethodId, MethodStatus>,
}

impl CurrentStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, id: MethodId) -> Option<MethodStatus> {
        self.statuses.get(&id).copied()
    }
}

impl MethodCollector for CurrentStatus {
    fn name(&self) -> &'static str {
        "status"
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        self.statuses.insert(event.id, event.status);
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.status(id)
            .map(|s| CollectorOutput::Scalar(FeatureValue::Int(s.code())))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for CurrentStatus {
    fn flush(&mut self, _ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for id in boundary.deleted {
            self.statuses.insert(*id, MethodStatus::Deleted);
        }
    }
}
