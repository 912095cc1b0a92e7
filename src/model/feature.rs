//! Feature values and the merged per-method feature matrix

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::method::MethodId;

/// A single feature cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FeatureValue {
    /// Short type tag used by the database layer
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Int(_) => "i",
            FeatureValue::Float(_) => "f",
            FeatureValue::Bool(_) => "b",
        }
    }

    /// Inverse of `kind()` + `to_string()`
    pub fn parse(kind: &str, text: &str) -> Option<Self> {
        match kind {
            "i" => text.parse().ok().map(FeatureValue::Int),
            "f" => text.parse().ok().map(FeatureValue::Float),
            "b" => text.parse().ok().map(FeatureValue::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            // Debug keeps the trailing `.0` on whole numbers
            FeatureValue::Float(v) => write!(f, "{:?}", v),
            FeatureValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Int(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

/// What one collector reports for one method
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorOutput {
    Scalar(FeatureValue),
    List(Vec<FeatureValue>),
}

impl CollectorOutput {
    /// Append this output to a row, splicing lists in place
    pub fn splice_into(self, row: &mut Vec<FeatureValue>) {
        match self {
            CollectorOutput::Scalar(v) => row.push(v),
            CollectorOutput::List(values) => row.extend(values),
        }
    }
}

/// One merged feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub id: MethodId,
    pub file: String,
    pub signature: String,
    pub values: Vec<FeatureValue>,
}

/// Content size of one processed commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSize {
    pub index: usize,
    pub commit: String,
    pub author: String,
    pub timestamp: i64,
    /// Lines of source content in the commit's file set
    pub lines: usize,
}

/// The result of a run: one row per method id, ordered by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub methods: Vec<FeatureRow>,
    #[serde(default)]
    pub commits: Vec<CommitSize>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            methods: Vec::new(),
            commits: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn row(&self, id: MethodId) -> Option<&FeatureRow> {
        self.methods.iter().find(|r| r.id == id)
    }

    /// Value of a named column for a method
    pub fn value(&self, id: MethodId, column: &str) -> Option<&FeatureValue> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.row(id)?.values.get(idx)
    }

    /// `<id>, <v1>, <v2>, ...` one line per method
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in &self.methods {
            out.push_str(&row.id.to_string());
            for value in &row.values {
                out.push_str(", ");
                out.push_str(&value.to_string());
            }
            out.push('\n');
        }
        out
    }

    /// `<index>, <lines>` one line per processed commit
    pub fn commit_sizes_text(&self) -> String {
        self.commits
            .iter()
            .map(|c| format!("{}, {}\n", c.index, c.lines))
            .collect()
    }

    pub fn write_text(&self, dir: &Path, label: &str) -> Result<PathBuf> {
        write_file(dir, label, &self.to_text())
    }

    /// Commit sizes next to the features, as `<label>.commits`
    pub fn write_commit_sizes(&self, dir: &Path, label: &str) -> Result<PathBuf> {
        write_file(dir, &format!("{}.commits", label), &self.commit_sizes_text())
    }

    pub fn write_json(&self, dir: &Path, label: &str) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self)?;
        write_file(dir, &format!("{}.json", label), &json)
    }
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Could not create output directory {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("Could not write {}", path.display()))?;
    Ok(path)
}
