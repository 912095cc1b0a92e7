use rustc_hash::FxHashMap;

use crate::engine::differ::line_similarity;
use crate::model::{CollectorOutput, FeatureValue, MethodId};

use super::{BoundaryEvent, CommitBoundary, CommitContext, MethodCollector, MethodEvent};

/// Smoothed similarity of a method to its earlier forms.
///
/// Starts at 1.0 on first observation; every later commit averages the tracked
/// value with that commit's line similarity, unchanged commits included.
#[derive(Default)]
pub struct FadingSimilarity {
    tracked: FxHashMap<MethodId, f64>,
}

impl FadingSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    fn fade(&mut self, id: MethodId, ratio: f64) {
        if let Some(value) = self.tracked.get_mut(&id) {
            *value = (*value + ratio) / 2.0;
        }
    }
}

impl MethodCollector for FadingSimilarity {
    fn name(&self) -> &'static str {
        "fading_similarity"
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        if !self.tracked.contains_key(&event.id) {
            self.tracked.insert(event.id, 1.0);
            return;
        }
        let ratio = line_similarity(event.old_lines(), Some(event.new_lines()));
        self.fade(event.id, ratio);
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.tracked
            .get(&id)
            .map(|&v| CollectorOutput::Scalar(FeatureValue::Float(v)))
    }

    fn boundary(&mut self) -> Option<&mut dyn CommitBoundary> {
        Some(self)
    }
}

impl CommitBoundary for FadingSimilarity {
    fn flush(&mut self, _ctx: &CommitContext<'_>, boundary: &BoundaryEvent<'_>) {
        for &id in boundary.deleted {
            self.fade(id, 0.0);
        }
    }
}
