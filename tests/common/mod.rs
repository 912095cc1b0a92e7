// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{Repository, Signature, Time};
use methodtrail::model::{CommitSnapshot, FeatureMatrix, FileChange, MethodId};
use methodtrail::repository::Database;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create an in-memory test database with initialized schema
pub async fn create_test_db() -> Database {
    let db = Database::in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    db
}

/// Create a temporary git repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

/// Write files and commit them at the given committer time
pub fn add_commit_at(
    repo: &Repository,
    files: &[(&str, &str)],
    message: &str,
    seconds: i64,
) -> git2::Oid {
    add_commit_by(repo, "Test User", files, message, seconds)
}

/// Write files and commit them as `author` at `seconds`
pub fn add_commit_by(
    repo: &Repository,
    author: &str,
    files: &[(&str, &str)],
    message: &str,
    seconds: i64,
) -> git2::Oid {
    let sig = Signature::new(author, "test@example.com", &Time::new(seconds, 0)).unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }

    commit_index(repo, &mut index, &sig, message)
}

/// Write files and commit them now
pub fn add_commit(repo: &Repository, files: &[(&str, &str)], message: &str) -> git2::Oid {
    let now = Signature::now("Test User", "test@example.com").unwrap();
    add_commit_at(repo, files, message, now.when().seconds())
}

/// Remove a file from the repository and create a commit
pub fn remove_file_commit(repo: &Repository, path: &str, message: &str, seconds: i64) -> git2::Oid {
    let sig = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0)).unwrap();

    let full_path = repo.workdir().unwrap().join(path);
    if full_path.exists() {
        std::fs::remove_file(&full_path).unwrap();
    }

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(path)).unwrap();
    commit_index(repo, &mut index, &sig, message)
}

/// Create a branch pointing at HEAD
pub fn create_branch(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(name, &head, false).unwrap();
}

fn commit_index(
    repo: &Repository,
    index: &mut git2::Index,
    sig: &Signature<'_>,
    message: &str,
) -> git2::Oid {
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), sig, sig, message, &tree, &parents)
        .unwrap()
}

/// A Java class with the given members, one blank line between them
pub fn java_class(name: &str, members: &[&str]) -> String {
    let mut source = format!("public class {} {{\n", name);
    for member in members {
        for line in member.lines() {
            source.push_str("    ");
            source.push_str(line);
            source.push('\n');
        }
        source.push('\n');
    }
    source.push_str("}\n");
    source
}

pub const ADD: &str = "public int add(int a, int b) {\n    return a + b;\n}";
pub const ADD_CHECKED: &str =
    "public int add(int a, int b) {\n    return Math.addExact(a, b);\n}";
pub const SUB: &str = "public int sub(int a, int b) {\n    return a - b;\n}";
pub const NEG: &str = "public int neg(int a) {\n    return -a;\n}";

/// An in-memory commit, for driving the aggregator without git
pub fn snapshot(timestamp: i64, files: &[(&str, &str)]) -> CommitSnapshot {
    snapshot_by("Test User", timestamp, files)
}

/// Like `snapshot`, authored by `author`
pub fn snapshot_by(author: &str, timestamp: i64, files: &[(&str, &str)]) -> CommitSnapshot {
    CommitSnapshot {
        oid: gix::ObjectId::null(gix::hash::Kind::Sha1),
        author: author.into(),
        committer: author.into(),
        committer_timestamp: timestamp,
        files: files
            .iter()
            .map(|(path, source)| {
                FileChange::new(*path, source.lines().map(str::to_string).collect())
            })
            .collect(),
    }
}

/// Id of the only method whose signature contains `needle`
pub fn method_id(matrix: &FeatureMatrix, needle: &str) -> MethodId {
    let matches: Vec<_> = matrix
        .methods
        .iter()
        .filter(|row| row.signature.contains(needle))
        .collect();
    assert_eq!(matches.len(), 1, "expected one method matching {}", needle);
    matches[0].id
}
