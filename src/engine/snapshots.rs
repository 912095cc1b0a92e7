use crate::model::{MethodId, MethodSnapshot};

/// Snapshots of one commit, indexed densely by method id
#[derive(Debug, Default, Clone)]
pub struct SnapshotTable {
    slots: Vec<Option<MethodSnapshot>>,
    present: usize,
}

impl SnapshotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, returning false if the id was already filled
    pub fn insert(&mut self, id: MethodId, snapshot: MethodSnapshot) -> bool {
        let idx = id.index();
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        if self.slots[idx].is_some() {
            return false;
        }
        self.slots[idx] = Some(snapshot);
        self.present += 1;
        true
    }

    pub fn get(&self, id: MethodId) -> Option<&MethodSnapshot> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn lines(&self, id: MethodId) -> Option<&[String]> {
        self.get(id).map(|s| &s.lines[..])
    }

    pub fn contains(&self, id: MethodId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| MethodId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.present
    }

    pub fn is_empty(&self) -> bool {
        self.present == 0
    }
}
