//! Method identity interning
//!
//! Maps `(file, signature)` keys to dense `MethodId`s for the lifetime of a run.

use rustc_hash::FxHashMap;

use crate::model::{MethodId, MethodKey};

/// Content-addressed table of method identities.
///
/// Ids are allocated monotonically from 0 and never reassigned.
#[derive(Default)]
pub struct MethodIdentity {
    map: FxHashMap<MethodKey, MethodId>,
    keys: Vec<MethodKey>,
}

impl MethodIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for a key, allocating the next one if unseen
    pub fn resolve(&mut self, file_path: &str, signature: &str) -> MethodId {
        let key = MethodKey {
            file_path: file_path.to_string(),
            signature: signature.to_string(),
        };
        if let Some(&id) = self.map.get(&key) {
            return id;
        }
        let id = MethodId(self.keys.len() as u32);
        self.map.insert(key.clone(), id);
        self.keys.push(key);
        id
    }

    pub fn key(&self, id: MethodId) -> Option<&MethodKey> {
        self.keys.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All ids in allocation order
    pub fn ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        (0..self.keys.len() as u32).map(MethodId)
    }

    /// Forget every identity; only valid at the start of a run
    pub fn reset(&mut self) {
        self.map.clear();
        self.keys.clear();
    }
}

/// Dense integer ids for plain names (normalized signatures without file)
#[derive(Default)]
pub struct NameTable {
    map: FxHashMap<String, u32>,
    names: Vec<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.map.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.map.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn reset(&mut self) {
        self.map.clear();
        self.names.clear();
    }
}
