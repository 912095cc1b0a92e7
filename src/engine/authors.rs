use std::collections::BTreeMap;

use crate::model::{FeatureMatrix, FeatureRow};

use super::collectors::{BoundaryEvent, CommitContext, MethodCollector, MethodEvent};
use super::context::RunContext;

/// Builds one fresh collector set
pub type CollectorFactory = Box<dyn Fn() -> Vec<Box<dyn MethodCollector>>>;

struct AuthorGroup {
    collectors: Vec<Box<dyn MethodCollector>>,
    commits: usize,
}

/// A separate collector set per commit author.
///
/// Each set only sees the commits of its author. Commit positions are counted
/// per author, so a set behaves as if its author's commits were the whole run.
pub struct AuthorCollectors {
    factory: CollectorFactory,
    groups: BTreeMap<String, AuthorGroup>,
}

impl AuthorCollectors {
    pub fn new(factory: CollectorFactory) -> Self {
        Self {
            factory,
            groups: BTreeMap::new(),
        }
    }

    pub fn reset(&mut self) {
        self.groups.clear();
    }

    /// Authors seen so far, sorted
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Hand the events of one commit to its author's set, creating it on first sight
    pub fn dispatch(
        &mut self,
        ctx: &CommitContext<'_>,
        events: &[MethodEvent<'_>],
        boundary: &BoundaryEvent<'_>,
    ) {
        let group = self
            .groups
            .entry(ctx.author.to_string())
            .or_insert_with(|| AuthorGroup {
                collectors: (self.factory)(),
                commits: 0,
            });

        let local = CommitContext {
            index: group.commits,
            commits_processed: group.commits + 1,
            ..*ctx
        };
        for event in events {
            for collector in group.collectors.iter_mut() {
                collector.collect(&local, event);
            }
        }
        for collector in group.collectors.iter_mut() {
            if let Some(flushable) = collector.boundary() {
                flushable.flush(&local, boundary);
            }
        }
        group.commits += 1;
    }

    /// One matrix per author, holding only the methods and commits of that author
    pub fn finish(&self, context: &RunContext) -> BTreeMap<String, FeatureMatrix> {
        self.groups
            .iter()
            .map(|(author, group)| {
                let mut matrix = group_matrix(&group.collectors, context);
                matrix.commits = context
                    .commit_sizes()
                    .iter()
                    .filter(|c| c.author == *author)
                    .cloned()
                    .collect();
                (author.clone(), matrix)
            })
            .collect()
    }
}

fn group_matrix(collectors: &[Box<dyn MethodCollector>], context: &RunContext) -> FeatureMatrix {
    let columns = collectors.iter().flat_map(|c| c.columns()).collect();
    let mut matrix = FeatureMatrix::new(columns);

    for id in context.identity().ids() {
        let Some(key) = context.key(id) else {
            continue;
        };
        let outputs: Vec<_> = collectors.iter().filter_map(|c| c.value(id)).collect();
        if outputs.is_empty() {
            continue;
        }
        let mut values = Vec::new();
        for output in outputs {
            output.splice_into(&mut values);
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
