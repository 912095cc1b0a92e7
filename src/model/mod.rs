mod commit;
mod feature;
mod method;
mod status;

pub use commit::{CommitSnapshot, FileChange};
pub use feature::{CollectorOutput, CommitSize, FeatureMatrix, FeatureRow, FeatureValue};
pub use method::{MethodDeclaration, MethodId, MethodKey, MethodSnapshot};
pub use status::{HISTORY_SENTINEL, MethodStatus};
