use crate::model::{CommitSize, MethodId, MethodKey};

use super::identity::{MethodIdentity, NameTable};

/// State scoped to one run over a commit stream.
///
/// Owned by the aggregator; collectors only ever see values derived from it.
#[derive(Default)]
pub struct RunContext {
    identity: MethodIdentity,
    names: NameTable,
    commits: Vec<CommitSize>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; called at the start of every run
    pub fn reset(&mut self) {
        self.identity.reset();
        self.names.reset();
        self.commits.clear();
    }

    /// Resolve a method and its file-independent signature
    pub fn resolve(&mut self, file_path: &str, qualified: &str, signature: &str) -> (MethodId, u32) {
        let id = self.identity.resolve(file_path, qualified);
        let signature_id = self.names.intern(signature);
        (id, signature_id)
    }

    pub fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    pub fn key(&self, id: MethodId) -> Option<&MethodKey> {
        self.identity.key(id)
    }

    pub fn commits_processed(&self) -> usize {
        self.commits.len()
    }

    /// Content size of every processed commit, in processing order
    pub fn commit_sizes(&self) -> &[CommitSize] {
        &self.commits
    }

    pub(crate) fn commit_done(&mut self, size: CommitSize) {
        self.commits.push(size);
    }
}
