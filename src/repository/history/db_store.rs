//! Database implementation of FeatureStore

use anyhow::Result;

use crate::model::FeatureMatrix;
use crate::repository::{Database, FeatureRecord, MethodRecord, RunRecords};

use super::progress::ProgressReporter;
use super::store::FeatureStore;

impl FeatureStore for Database {
    async fn get_run_key(&self, label: &str) -> Option<String> {
        Database::get_run_key(self, label).await
    }

    async fn save_run(
        &self,
        label: &str,
        run_key: &str,
        matrix: &FeatureMatrix,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let methods: Vec<MethodRecord<'_>> = matrix
            .methods
            .iter()
            .map(|row| MethodRecord::new(row.id.0, row.file.as_str(), row.signature.as_str()))
            .collect();

        let features: Vec<FeatureRecord> = matrix
            .methods
            .iter()
            .flat_map(|row| {
                row.values
                    .iter()
                    .enumerate()
                    .map(move |(position, value)| FeatureRecord::new(row.id.0, position, value))
            })
            .collect();

        let pb = progress.start("Saving", features.len() as u64);
        let records = RunRecords {
            columns: &matrix.columns,
            methods: &methods,
            features: &features,
            commits: &matrix.commits,
        };
        self.save_run_with_callback(label, run_key, records, |n| pb.inc(n as u64))
            .await?;
        pb.finish();

        Ok(())
    }

    async fn load_run(&self, label: &str) -> Result<FeatureMatrix> {
        Database::load_run(self, label).await
    }
}
