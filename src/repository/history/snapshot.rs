//! Commit snapshot context
//!
//! Walks one commit tree at a time and materializes the content of every
//! matching source file. Content is shared with the previous commit by blob id
//! so unchanged files are read once.

use std::sync::Arc;

use gix::ObjectId;
use gix::prelude::{Find, FindExt};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::model::{CommitSnapshot, FileChange};
use crate::util::has_extension;

use super::types::{CommitInfo, HistoryError, SnapshotStats};

/// Buffer pool for reusing decode buffers across recursion
#[derive(Default)]
pub struct BufferPool {
    buffers: Vec<Vec<u8>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<u8> {
        self.buffers
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(8 * 1024))
    }

    pub fn give(&mut self, mut buf: Vec<u8>) {
        buf.clear();
        self.buffers.push(buf);
    }
}

/// Split blob bytes into lines, replacing invalid UTF-8
pub fn split_lines(data: &[u8]) -> Arc<[String]> {
    String::from_utf8_lossy(data)
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into()
}

/// Builds `CommitSnapshot`s for consecutive commits
pub struct SnapshotCtx<'a, S: Find> {
    odb: &'a S,
    extensions: Vec<String>,
    max_file_bytes: Option<u64>,
    buf_pool: BufferPool,

    /// Source paths delivered by the previous snapshot
    previous_paths: FxHashSet<String>,
    /// Content of the previous snapshot by blob id
    content: FxHashMap<ObjectId, Arc<[String]>>,

    stats: SnapshotStats,
}

impl<'a, S: Find> SnapshotCtx<'a, S> {
    pub fn new(odb: &'a S, extensions: &[String], max_file_bytes: Option<u64>) -> Self {
        Self {
            odb,
            extensions: extensions.to_vec(),
            max_file_bytes,
            buf_pool: BufferPool::new(),
            previous_paths: FxHashSet::default(),
            content: FxHashMap::default(),
            stats: SnapshotStats::default(),
        }
    }

    /// Full source file set of one commit, plus absence markers for source
    /// paths the previous snapshot had and this one lacks
    pub fn snapshot(&mut self, oid: ObjectId) -> Result<CommitSnapshot, HistoryError> {
        let info = self.commit_info(oid)?;

        let mut entries = Vec::new();
        let mut path = Vec::with_capacity(256);
        self.scan_tree(info.tree, &mut path, &mut entries)?;

        let mut next_content: FxHashMap<ObjectId, Arc<[String]>> = FxHashMap::default();
        let mut seen_paths = FxHashSet::default();
        let mut files = Vec::with_capacity(entries.len());

        for (path, blob) in entries {
            let cached = self
                .content
                .get(&blob)
                .or_else(|| next_content.get(&blob))
                .cloned();
            let lines = match cached {
                Some(lines) => {
                    self.stats.blobs_reused += 1;
                    lines
                }
                None => match self.read_lines(blob)? {
                    Some(lines) => lines,
                    None => {
                        debug!(path = %path, blob = %blob, "skipping oversized file");
                        self.stats.oversized += 1;
                        continue;
                    }
                },
            };
            next_content.insert(blob, lines.clone());
            seen_paths.insert(path.clone());
            files.push(FileChange::with_blob(path, blob, lines));
        }

        let mut vanished: Vec<&String> = self.previous_paths.difference(&seen_paths).collect();
        vanished.sort();
        files.extend(vanished.into_iter().map(|p| FileChange::deleted(p.clone())));

        self.previous_paths = seen_paths;
        self.content = next_content;
        self.stats.commits += 1;

        Ok(CommitSnapshot {
            oid: info.oid,
            author: info.author,
            committer: info.committer,
            committer_timestamp: info.timestamp,
            files,
        })
    }

    fn commit_info(&mut self, oid: ObjectId) -> Result<CommitInfo, HistoryError> {
        let mut buf = self.buf_pool.take();
        let info = {
            let commit = self
                .odb
                .find_commit(&oid, &mut buf)
                .map_err(|e| HistoryError::Object {
                    oid,
                    reason: e.to_string(),
                })?;
            let author = commit
                .author()
                .map(|sig| sig.name.to_string())
                .unwrap_or_default();
            let committer = commit.committer().map_err(|e| HistoryError::Object {
                oid,
                reason: e.to_string(),
            })?;
            CommitInfo {
                oid,
                tree: commit.tree(),
                author,
                committer: committer.name.to_string(),
                timestamp: committer.seconds(),
            }
        };
        self.buf_pool.give(buf);
        Ok(info)
    }

    fn scan_tree(
        &mut self,
        tree_oid: ObjectId,
        path: &mut Vec<u8>,
        out: &mut Vec<(String, ObjectId)>,
    ) -> Result<(), HistoryError> {
        self.stats.trees_visited += 1;
        let mut buf = self.buf_pool.take();

        // Children are collected first so the buffer can go back to the pool
        // before recursing.
        let children: Vec<(Vec<u8>, ObjectId, bool)> = {
            let tree = self
                .odb
                .find_tree(&tree_oid, &mut buf)
                .map_err(|e| HistoryError::Object {
                    oid: tree_oid,
                    reason: e.to_string(),
                })?;
            tree.entries
                .iter()
                .filter(|entry| entry.mode.is_blob() || entry.mode.is_tree())
                .map(|entry| {
                    let name: &[u8] = entry.filename.as_ref();
                    (name.to_vec(), entry.oid.to_owned(), entry.mode.is_tree())
                })
                .collect()
        };
        self.buf_pool.give(buf);

        let base_len = path.len();
        for (name, oid, is_tree) in children {
            if !path.is_empty() {
                path.push(b'/');
            }
            path.extend_from_slice(&name);

            if is_tree {
                self.scan_tree(oid, path, out)?;
            } else {
                let as_str = String::from_utf8_lossy(path);
                if has_extension(&as_str, &self.extensions) {
                    out.push((as_str.into_owned(), oid));
                }
            }

            path.truncate(base_len);
        }
        Ok(())
    }

    fn read_lines(&mut self, blob: ObjectId) -> Result<Option<Arc<[String]>>, HistoryError> {
        let mut buf = self.buf_pool.take();
        let max = self.max_file_bytes;
        let result = match self.odb.find_blob(&blob, &mut buf) {
            Ok(b) if max.is_some_and(|max| b.data.len() as u64 > max) => Ok(None),
            Ok(b) => Ok(Some(split_lines(b.data))),
            Err(e) => Err(HistoryError::Object {
                oid: blob,
                reason: e.to_string(),
            }),
        };
        self.buf_pool.give(buf);
        if matches!(result, Ok(Some(_))) {
            self.stats.blobs_read += 1;
        }
        result
    }

    pub fn stats(&self) -> SnapshotStats {
        self.stats
    }
}
