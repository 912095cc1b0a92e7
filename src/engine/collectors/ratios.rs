use rustc_hash::FxHashMap;

use crate::model::{CollectorOutput, FeatureValue, MethodId, MethodStatus};

use super::{BoundaryEvent, CommitBoundary, CommitContext, MethodCollector, MethodEvent};

#[derive(Debug, Clone, Copy)]
struct ChangeCount {
    first_index: usize,
    changes: u64,
    elapsed: u64,
}

/// Fraction of commits since first appearance in which the code changed
#[derive(Default)]
pub struct ChangeRatio {
    counts: FxHashMap<MethodId, ChangeCount>,
}

impl ChangeRatio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ratio(&self, id: MethodId) -> Option<f64> {
        let count = self.counts.get(&id)?;
        // A method seen in a single commit has no elapsed history yet
        if count.elapsed == 0 {
            return Some(0.0);
        }
        Some(count.changes as f64 / count.elapsed as f64)
    }
}

impl MethodCollector for ChangeRatio {
    fn name(&self) -> &'static str {
        "change_ratio"
    }

    fn collect(&mut self, ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        match self.counts.get_mut(&event.id) {
            None => {
                self.counts.insert(
                    event.id,
                    ChangeCount {
                        first_index: ctx.index,
                        changes: 0,
                        elapsed: 0,
                    },
                );
            }
            Some(count) => {
                if matches!(event.status, MethodStatus::Added | MethodStatus::Modified) {
                    count.changes += 1;
                }
            }
        }
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.ratio(id)
            .map(|r| CollectorOutput::Scalar(FeatureValue::Float(r)))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for ChangeRatio {
    fn flush(&mut self, ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for id in boundary.deleted {
            if let Some(count) = self.counts.get_mut(id) {
                count.changes += 1;
            }
        }
        for count in self.counts.values_mut() {
            count.elapsed = (ctx.index - count.first_index) as u64;
        }
    }
}

/// Fraction of all processed commits in which the method was present
#[derive(Default)]
pub struct ExistenceRatio {
    observed: FxHashMap<MethodId, u64>,
    total: u64,
}

impl ExistenceRatio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ratio(&self, id: MethodId) -> Option<f64> {
        let seen = *self.observed.get(&id)?;
        if self.total == 0 {
            return Some(0.0);
        }
        Some(seen as f64 / self.total as f64)
    }
}

impl MethodCollector for ExistenceRatio {
    fn name(&self) -> &'static str {
        "existence_ratio"
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        *self.observed.entry(event.id).or_insert(0) += 1;
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.ratio(id)
            .map(|r| CollectorOutput::Scalar(FeatureValue::Float(r)))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for ExistenceRatio {
    fn flush(&mut self, ctx: &CommitContext<'_>, _boundary: &BoundaryEvent<'_>) {
        self.total = ctx.commits_processed as u64;
    }
}
