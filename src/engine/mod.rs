//! Method identity and change-classification engine
//!
//! # Architecture
//!
//! - **signature**: canonical signatures from raw declaration text
//! - **identity**: `(file, signature)` to dense `MethodId` interning
//! - **differ**: snapshot comparison and line similarity
//! - **classifier**: per-commit ADDED / MODIFIED / NO_CHANGE / DELETED state machine
//! - **history**: fixed-capacity FIFO used by the bounded accumulators
//! - **collectors**: the feature accumulators and their commit-boundary capability
//! - **aggregator**: the commit-cycle orchestrator merging everything into a feature matrix
//! - **authors**: an independent collector set per commit author

pub mod collectors;

mod aggregator;
mod authors;
mod classifier;
mod context;
mod differ;
mod history;
mod identity;
mod signature;
mod snapshots;

pub use aggregator::{CommitReport, MethodsAggregator};
pub use authors::{AuthorCollectors, CollectorFactory};
pub use classifier::{ChangeClassifier, classify};
pub use context::RunContext;
pub use differ::{code_changed, line_similarity};
pub use history::BoundedHistory;
pub use identity::{MethodIdentity, NameTable};
pub use signature::normalize_signature;
pub use snapshots::SnapshotTable;
