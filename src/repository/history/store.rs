//! Feature store trait for persistence abstraction

use anyhow::Result;

use crate::model::FeatureMatrix;

use super::progress::ProgressReporter;

/// Persistence layer for finished runs
///
/// A run is identified by its output label. The run key records what the
/// stored matrix was computed from (tip commit, commit range, settings), so a
/// matching key means the stored matrix can be returned without walking history.
#[allow(async_fn_in_trait)]
pub trait FeatureStore {
    /// Key of the stored run with this label, if any
    async fn get_run_key(&self, label: &str) -> Option<String>;

    /// Replace the stored run with this label
    async fn save_run(
        &self,
        label: &str,
        run_key: &str,
        matrix: &FeatureMatrix,
        progress: &dyn ProgressReporter,
    ) -> Result<()>;

    /// Load a stored run
    async fn load_run(&self, label: &str) -> Result<FeatureMatrix>;
}
