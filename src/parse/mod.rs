//! Source parsing boundary
//!
//! Turns the text of one file into the method declarations it contains.

mod java;

pub use java::JavaParser;

use anyhow::Result;

use crate::model::MethodDeclaration;

/// Extracts method declarations from one source file
pub trait SourceParser {
    /// Whether this parser handles files at `path`
    fn supports(&self, path: &str) -> bool;

    /// Declarations in source order; an unparsable file yields an error or no methods
    fn parse(&mut self, path: &str, lines: &[String]) -> Result<Vec<MethodDeclaration>>;
}
