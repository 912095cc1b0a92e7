use rustc_hash::FxHashMap;

use crate::model::{CollectorOutput, FeatureValue, MethodId};

use super::{BoundaryEvent, CommitBoundary, CommitContext, MethodCollector, MethodEvent};

/// Commits elapsed since the method's code last changed
#[derive(Default)]
pub struct CommitsSinceLastChange {
    counters: FxHashMap<MethodId, i64>,
}

impl CommitsSinceLastChange {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MethodCollector for CommitsSinceLastChange {
    fn name(&self) -> &'static str {
        "commits_since_last_change"
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        self.counters.entry(event.id).or_insert(0);
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.counters
            .get(&id)
            .map(|&c| CollectorOutput::Scalar(FeatureValue::Int(c)))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for CommitsSinceLastChange {
    fn flush(&mut self, _ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for (id, counter) in self.counters.iter_mut() {
            let changed = boundary.statuses.get(id).is_some_and(|s| s.is_change());
            if changed {
                *counter = 0;
            } else {
                *counter += 1;
            }
        }
    }
}
