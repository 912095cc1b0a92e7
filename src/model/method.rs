use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Dense identifier of a logical method, stable for one run
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(pub u32);

impl MethodId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity key: enclosing file plus qualified normalized signature
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MethodKey {
    pub file_path: String,
    pub signature: String,
}

/// A method declaration as reported by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    /// Enclosing type names, outermost first
    pub nesting: Vec<String>,
    /// Raw text from the first modifier through the closing `)` of the parameters
    pub declaration: String,
    pub return_type: Option<String>,
    /// 0-based, inclusive
    pub start_line: usize,
    pub end_line: usize,
}

impl MethodDeclaration {
    pub fn nesting_path(&self) -> String {
        self.nesting.join(".")
    }
}

/// Body of one method at one commit
#[derive(Debug, Clone)]
pub struct MethodSnapshot {
    pub lines: Arc<[String]>,
    pub file_path: String,
    pub nesting: String,
    pub return_type: Option<String>,
    pub start_line: usize,
}

impl MethodSnapshot {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
