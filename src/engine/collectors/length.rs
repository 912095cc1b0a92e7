use rustc_hash::FxHashMap;

use crate::model::{CollectorOutput, FeatureValue, MethodId};

use super::{BoundaryEvent, CommitBoundary, CommitContext, MethodCollector, MethodEvent};

/// Current number of lines in the method body, 0 once deleted
#[derive(Default)]
pub struct MethodLength {
    lengths: FxHashMap<MethodId, usize>,
}

impl MethodLength {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MethodCollector for MethodLength {
    fn name(&self) -> &'static str {
        "length"
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        self.lengths.insert(event.id, event.new.len());
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.lengths
            .get(&id)
            .map(|&l| CollectorOutput::Scalar(FeatureValue::Int(l as i64)))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for MethodLength {
    fn flush(&mut self, _ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for id in boundary.deleted {
            self.lengths.insert(*id, 0);
        }
    }
}
