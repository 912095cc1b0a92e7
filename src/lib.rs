//! Per-method change history features extracted from git repositories.
//!
//! The library is split into the pure [`engine`] (identity, classification
//! and feature accumulators), the [`parse`] boundary turning source files into
//! method declarations, and the [`repository`] layer walking git history and
//! caching finished runs.

pub mod config;
pub mod engine;
pub mod model;
pub mod parse;
pub mod repository;
pub mod util;
