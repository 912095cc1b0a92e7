use rustc_hash::FxHashMap;

use crate::model::{CollectorOutput, FeatureValue, MethodId};

use super::{CommitContext, MethodCollector, MethodEvent};

/// Reports the run-scoped integer of each method's normalized signature
#[derive(Default)]
pub struct SignatureId {
    ids: FxHashMap<MethodId, u32>,
}

impl SignatureId {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MethodCollector for SignatureId {
    fn name(&self) -> &'static str {
        "signature_id"
    }

    fn collect(&mut self, _ctx: &CommitContext<'_>, event: &MethodEvent<'_>) {
        self.ids.insert(event.id, event.signature_id);
    }

    fn value(&self, id: MethodId) -> Option<CollectorOutput> {
        self.ids
            .get(&id)
            .map(|&s| CollectorOutput::Scalar(FeatureValue::Int(i64::from(s))))
    }
}
