use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel used to pad bounded histories that are shorter than their capacity
pub const HISTORY_SENTINEL: i64 = -1;

/// What happened to a method at one commit boundary
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MethodStatus {
    /// First commit of the run, nothing to compare against
    Unknown,
    NoChange,
    Modified,
    Added,
    Deleted,
}

impl MethodStatus {
    /// Stable numeric code used in feature rows
    pub fn code(self) -> i64 {
        match self {
            MethodStatus::Unknown => 0,
            MethodStatus::NoChange => 1,
            MethodStatus::Modified => 2,
            MethodStatus::Added => 3,
            MethodStatus::Deleted => 4,
        }
    }

    /// Whether the method's code differs from the previous commit.
    ///
    /// `Unknown` counts as a change: it marks the first observation.
    pub fn is_change(self) -> bool {
        !matches!(self, MethodStatus::NoChange)
    }
}

impl fmt::Display for MethodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MethodStatus::Unknown => "UNKNOWN",
            MethodStatus::NoChange => "NO_CHANGE",
            MethodStatus::Modified => "MODIFIED",
            MethodStatus::Added => "ADDED",
            MethodStatus::Deleted => "DELETED",
        };
        f.write_str(name)
    }
}
