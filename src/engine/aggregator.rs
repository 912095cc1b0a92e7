//! Commit-cycle orchestration
//!
//! One `process_commit` call is the atomic unit of progress: files are parsed
//! and resolved first, and only once that succeeded are events dispatched to
//! collectors, deletions flushed and the previous-snapshot table replaced.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use gix::ObjectId;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::model::{
    CommitSize, CommitSnapshot, FeatureMatrix, FeatureRow, FileChange, MethodDeclaration,
    MethodId, MethodSnapshot, MethodStatus,
};
use crate::parse::SourceParser;

use super::authors::{AuthorCollectors, CollectorFactory};
use super::classifier::ChangeClassifier;
use super::collectors::{BoundaryEvent, CommitContext, MethodCollector, MethodEvent};
use super::context::RunContext;
use super::signature::normalize_signature;
use super::snapshots::SnapshotTable;

/// Summary of one processed commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub index: usize,
    pub methods: usize,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub skipped_files: usize,
}

/// Drives every registered collector through the commit stream
pub struct MethodsAggregator<P: SourceParser> {
    parser: P,
    collectors: Vec<Box<dyn MethodCollector>>,
    context: RunContext,
    classifier: ChangeClassifier,
    previous: SnapshotTable,
    parsed: FxHashMap<ObjectId, Arc<[MethodDeclaration]>>,
    max_files_per_commit: Option<usize>,
    authors: Option<AuthorCollectors>,
}

impl<P: SourceParser> MethodsAggregator<P> {
    pub fn new(parser: P, collectors: Vec<Box<dyn MethodCollector>>) -> Self {
        Self {
            parser,
            collectors,
            context: RunContext::new(),
            classifier: ChangeClassifier::new(),
            previous: SnapshotTable::new(),
            parsed: FxHashMap::default(),
            max_files_per_commit: None,
            authors: None,
        }
    }

    /// Also feed a separate collector set per commit author
    pub fn with_author_collectors(mut self, factory: CollectorFactory) -> Self {
        self.authors = Some(AuthorCollectors::new(factory));
        self
    }

    /// Skip commits carrying more source files than `limit`
    pub fn with_max_files(mut self, limit: Option<usize>) -> Self {
        self.max_files_per_commit = limit;
        self
    }

    /// Start a new run with fresh collectors, keeping the parser
    pub fn restart(&mut self, collectors: Vec<Box<dyn MethodCollector>>) {
        self.collectors = collectors;
        self.context.reset();
        self.classifier = ChangeClassifier::new();
        self.previous = SnapshotTable::new();
        self.parsed.clear();
        if let Some(authors) = self.authors.as_mut() {
            authors.reset();
        }
    }

    /// Number of fully processed commits
    pub fn commit_index(&self) -> usize {
        self.context.commits_processed()
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Snapshot of a method as of the last processed commit
    pub fn previous(&self, id: MethodId) -> Option<&MethodSnapshot> {
        self.previous.get(id)
    }

    /// Status assigned to a method in the last processed commit
    pub fn status(&self, id: MethodId) -> Option<MethodStatus> {
        self.classifier.status(id)
    }

    pub fn process_commit(&mut self, commit: &CommitSnapshot) -> Result<CommitReport> {
        let source_files = commit
            .files
            .iter()
            .filter(|f| !f.is_deleted() && self.parser.supports(&f.path))
            .count();
        if let Some(limit) = self.max_files_per_commit {
            if source_files > limit {
                bail!(
                    "commit {} carries {} source files (limit {})",
                    commit.oid,
                    source_files,
                    limit
                );
            }
        }

        // Extraction: nothing below touches collector state
        let mut current = SnapshotTable::new();
        let mut pending: Vec<(MethodId, u32)> = Vec::new();
        let mut parsed = FxHashMap::default();
        let mut skipped_files = 0;

        for file in &commit.files {
            let Some(lines) = &file.lines else {
                continue;
            };
            if !self.parser.supports(&file.path) {
                continue;
            }
            let declarations = match self.declarations(file, lines) {
                Ok(d) => d,
                Err(err) => {
                    warn!(path = %file.path, error = %err, "skipping unparsable file");
                    skipped_files += 1;
                    continue;
                }
            };
            if let Some(blob) = file.blob {
                parsed.insert(blob, declarations.clone());
            }

            for decl in declarations.iter() {
                let Some(body) = lines.get(decl.start_line..=decl.end_line) else {
                    debug!(path = %file.path, line = decl.start_line, "declaration outside file bounds");
                    continue;
                };
                let signature = normalize_signature(&decl.declaration);
                let nesting = decl.nesting_path();
                let qualified = if nesting.is_empty() {
                    signature.clone()
                } else {
                    format!("{}::{}", nesting, signature)
                };
                let (id, signature_id) = self.context.resolve(&file.path, &qualified, &signature);
                let snapshot = MethodSnapshot {
                    lines: Arc::from(body),
                    file_path: file.path.clone(),
                    nesting,
                    return_type: decl.return_type.clone(),
                    start_line: decl.start_line,
                };
                if current.insert(id, snapshot) {
                    pending.push((id, signature_id));
                } else {
                    debug!(path = %file.path, signature = %qualified, "duplicate declaration ignored");
                }
            }
        }

        // Dispatch: infallible from here on
        let index = self.context.commits_processed();
        let ctx = CommitContext {
            index,
            commits_processed: index + 1,
            timestamp: commit.committer_timestamp,
            author: &commit.author,
            first_commit: index == 0,
        };

        let mut report = CommitReport {
            index,
            methods: pending.len(),
            skipped_files,
            ..CommitReport::default()
        };

        let mut events = Vec::with_capacity(pending.len());
        self.classifier.begin_commit();
        for &(id, signature_id) in &pending {
            let Some(new) = current.get(id) else {
                continue;
            };
            let old = self.previous.get(id);
            let status = self.classifier.observe(
                ctx.first_commit,
                id,
                old.map(|s| &s.lines[..]),
                &new.lines,
            );
            match status {
                MethodStatus::Added => report.added += 1,
                MethodStatus::Modified => report.modified += 1,
                _ => {}
            }
            let event = MethodEvent {
                id,
                signature_id,
                status,
                new,
                old,
            };
            for collector in self.collectors.iter_mut() {
                collector.collect(&ctx, &event);
            }
            events.push(event);
        }

        let deleted = self.classifier.flush(&self.previous, &current);
        report.deleted = deleted.len();
        let boundary = BoundaryEvent {
            statuses: self.classifier.statuses(),
            deleted: &deleted,
        };
        for collector in self.collectors.iter_mut() {
            if let Some(flushable) = collector.boundary() {
                flushable.flush(&ctx, &boundary);
            }
        }
        if let Some(authors) = self.authors.as_mut() {
            authors.dispatch(&ctx, &events, &boundary);
        }

        self.context.commit_done(CommitSize {
            index,
            commit: commit.oid.to_hex().to_string(),
            author: commit.author.clone(),
            timestamp: commit.committer_timestamp,
            lines: commit.line_count(),
        });
        self.previous = current;
        self.parsed = parsed;
        Ok(report)
    }

    fn declarations(&mut self, file: &FileChange, lines: &[String]) -> Result<Arc<[MethodDeclaration]>> {
        if let Some(cached) = file.blob.and_then(|b| self.parsed.get(&b)) {
            return Ok(cached.clone());
        }
        Ok(Arc::from(self.parser.parse(&file.path, lines)?))
    }

    /// Column names in splice order
    pub fn columns(&self) -> Vec<String> {
        self.collectors.iter().flat_map(|c| c.columns()).collect()
    }

    /// Merge every collector's per-id output into one row per method
    pub fn finish(&self) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::new(self.columns());
        matrix.commits = self.context.commit_sizes().to_vec();
        for id in self.context.identity().ids() {
            let Some(key) = self.context.key(id) else {
                continue;
            };
            let mut values = Vec::new();
            for collector in &self.collectors {
                if let Some(output) = collector.value(id) {
                    output.splice_into(&mut values);
                }
            }
            matrix.methods.push(FeatureRow {
                id,
                file: key.file_path.clone(),
                signature: key.signature.clone(),
                values,
            });
        }
        matrix
    }

    /// Per-author matrices, empty unless author collectors were registered
    pub fn finish_by_author(&self) -> BTreeMap<String, FeatureMatrix> {
        self.authors
            .as_ref()
            .map(|authors| authors.finish(&self.context))
            .unwrap_or_default()
    }
}
