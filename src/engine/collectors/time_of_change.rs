use rustc_hash::FxHashMap;

use crate::engine::history::BoundedHistory;
use crate::model::{CollectorOutput, FeatureValue, HISTORY_SENTINEL, MethodId};

use super::{
    BoundaryEvent, CommitBoundary, CommitContext, MethodCollector, MethodEvent, list_columns,
};

/// Seconds between the latest commit and the method's last change
#[derive(Default)]
pub struct TimeSinceLastChange {
    last_change: FxHashMap<MethodId, i64>,
    now: i64,
}

impl TimeSinceLastChange {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MethodCollector for TimeSinceLastChange {
    fn name(&self) -> &'static str {
        "time_since_last_change"
    }

    fn collect(&mut self, ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        if event.status.is_change() || !self.last_change.contains_key(&event.id) {
            self.last_change.insert(event.id, ctx.timestamp);
        }
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.last_change
            .get(&id)
            .map(|&t| CollectorOutput::Scalar(FeatureValue::Int(self.now - t)))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for TimeSinceLastChange {
    fn flush(&mut self, ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for id in boundary.deleted {
            self.last_change.insert(*id, ctx.timestamp);
        }
        self.now = ctx.timestamp;
    }
}

/// Timestamps of the last N commits that changed the method
pub struct LatestChangeTimes {
    capacity: usize,
    histories: FxHashMap<MethodId, BoundedHistory<i64>>,
}

impl LatestChangeTimes {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            histories: FxHashMap::default(),
        }
    }
}

impl MethodCollector for LatestChangeTimes {
    fn name(&self) -> &'static str {
        "change_time"
    }

    fn columns(&self) -> Vec<String> {
        list_columns(self.name(), self.capacity)
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        let capacity = self.capacity;
        self.histories
            .entry(event.id)
            .or_insert_with(|| BoundedHistory::new(capacity));
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.histories.get(&id).map(|h| {
            CollectorOutput::List(
                h.padded(HISTORY_SENTINEL)
                    .into_iter()
                    .map(FeatureValue::Int)
                    .collect(),
            )
        })
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for LatestChangeTimes {
    fn flush(&mut self, ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for (id, status) in boundary.statuses {
            if !status.is_change() {
                continue;
            }
            if let Some(history) = self.histories.get_mut(id) {
                history.push(ctx.timestamp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collectors::harness::{commit, observed};
    use crate::model::MethodStatus;

    #[test]
    fn test_time_since_last_change_ages() {
        let mut t = TimeSinceLastChange::new();
        let v1: &[&str] = &["a"];
        commit(&mut t, 0, 100, &[observed(0, MethodStatus::Unknown, v1, None)], &[]);
        assert_eq!(t.value(MethodId(0)), Some(CollectorOutput::Scalar(FeatureValue::Int(0))));
        commit(&mut t, 1, 160, &[observed(0, MethodStatus::NoChange, v1, Some(v1))], &[]);
        assert_eq!(t.value(MethodId(0)), Some(CollectorOutput::Scalar(FeatureValue::Int(60))));
        commit(&mut t, 2, 200, &[observed(0, MethodStatus::Modified, &["b"], Some(v1))], &[]);
        assert_eq!(t.value(MethodId(0)), Some(CollectorOutput::Scalar(FeatureValue::Int(0))));
    }

    #[test]
    fn test_change_times_padded() {
        let mut t = LatestChangeTimes::new(3);
        let v1: &[&str] = &["a"];
        commit(&mut t, 0, 100, &[observed(0, MethodStatus::Unknown, v1, None)], &[]);
        commit(&mut t, 1, 200, &[observed(0, MethodStatus::NoChange, v1, Some(v1))], &[]);
        commit(&mut t, 2, 300, &[], &[0]);
        let expected = CollectorOutput::List(vec![
            FeatureValue::Int(-1),
            FeatureValue::Int(100),
            FeatureValue::Int(300),
        ]);
        assert_eq!(t.value(MethodId(0)), Some(expected));
        assert_eq!(t.columns(), vec!["change_time[0]", "change_time[1]", "change_time[2]"]);
    }
}
