// History walker tests against throw-away git repositories

mod common;

use common::{ADD, SUB, add_commit_at, create_branch, create_test_repo, java_class, remove_file_commit};
use methodtrail::config::CommitRange;
use methodtrail::repository::{HistoryError, HistoryWalker};

fn java() -> Vec<String> {
    vec!["java".to_string()]
}

fn hex(oid: &gix::ObjectId) -> String {
    oid.to_hex().to_string()
}

#[test]
fn test_commits_are_delivered_oldest_first() {
    let (_dir, path, repo) = create_test_repo();
    let c1 = add_commit_at(&repo, &[("A.java", "class A {}")], "first", 1_000);
    let c2 = add_commit_at(&repo, &[("B.java", "class B {}")], "second", 2_000);
    let c3 = add_commit_at(&repo, &[("C.java", "class C {}")], "third", 3_000);

    let walker = HistoryWalker::open(&path).unwrap();
    let (tip, commits) = walker.plan(None, None).unwrap();

    assert_eq!(hex(&tip), c3.to_string());
    let got: Vec<String> = commits.iter().map(hex).collect();
    assert_eq!(got, vec![c1.to_string(), c2.to_string(), c3.to_string()]);
}

#[test]
fn test_range_is_inclusive_and_clamped() {
    let (_dir, path, repo) = create_test_repo();
    let mut oids = Vec::new();
    for i in 0..4 {
        let name = format!("F{}.java", i);
        oids.push(add_commit_at(&repo, &[(name.as_str(), "class F {}")], "commit", 1_000 + i));
    }

    let walker = HistoryWalker::open(&path).unwrap();
    let (_, middle) = walker.plan(None, Some(CommitRange::new(1, 2))).unwrap();
    assert_eq!(
        middle.iter().map(hex).collect::<Vec<_>>(),
        vec![oids[1].to_string(), oids[2].to_string()]
    );

    let (_, tail) = walker.plan(None, Some(CommitRange::new(3, 50))).unwrap();
    assert_eq!(tail.len(), 1);

    let (_, none) = walker.plan(None, Some(CommitRange::new(10, 20))).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_branch_resolution() {
    let (_dir, path, repo) = create_test_repo();
    add_commit_at(&repo, &[("A.java", "class A {}")], "first", 1_000);
    let c2 = add_commit_at(&repo, &[("B.java", "class B {}")], "second", 2_000);
    create_branch(&repo, "feature");
    add_commit_at(&repo, &[("C.java", "class C {}")], "third", 3_000);

    let walker = HistoryWalker::open(&path).unwrap();
    let (tip, commits) = walker.plan(Some("feature"), None).unwrap();
    assert_eq!(hex(&tip), c2.to_string());
    assert_eq!(commits.len(), 2);

    let (_, head_commits) = walker.plan(None, None).unwrap();
    assert_eq!(head_commits.len(), 3);
}

#[test]
fn test_missing_branch_is_reported() {
    let (_dir, path, repo) = create_test_repo();
    add_commit_at(&repo, &[("A.java", "class A {}")], "first", 1_000);

    let walker = HistoryWalker::open(&path).unwrap();
    match walker.tip(Some("does-not-exist")) {
        Err(HistoryError::BranchNotFound(name)) => assert_eq!(name, "does-not-exist"),
        other => panic!("expected BranchNotFound, got {:?}", other),
    }
}

#[test]
fn test_open_non_repository_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = HistoryWalker::open(dir.path());
    assert!(matches!(result, Err(HistoryError::Open { .. })));
}

#[test]
fn test_snapshot_carries_full_source_file_set() {
    let (_dir, path, repo) = create_test_repo();
    let calc = java_class("Calc", &[ADD]);
    let util = java_class("Util", &[SUB]);
    add_commit_at(
        &repo,
        &[
            ("src/Calc.java", calc.as_str()),
            ("src/util/Util.java", util.as_str()),
            ("README.md", "# readme"),
        ],
        "initial",
        1_000,
    );
    let calc2 = java_class("Calc", &[ADD, SUB]);
    add_commit_at(&repo, &[("src/Calc.java", calc2.as_str())], "grow calc", 2_000);

    let walker = HistoryWalker::open(&path).unwrap();
    let (_, commits) = walker.plan(None, None).unwrap();
    let mut ctx = walker.snapshots(&java(), None);

    let first = ctx.snapshot(commits[0]).unwrap();
    let mut paths: Vec<&str> = first.files.iter().map(|f| f.path.as_str()).collect();
    paths.sort();
    assert_eq!(paths, vec!["src/Calc.java", "src/util/Util.java"]);
    assert_eq!(first.committer_timestamp, 1_000);
    assert_eq!(first.author, "Test User");
    assert_eq!(first.committer, "Test User");

    // Unchanged files are delivered too, with shared content
    let second = ctx.snapshot(commits[1]).unwrap();
    assert_eq!(second.files.len(), 2);
    let util_file = second
        .files
        .iter()
        .find(|f| f.path == "src/util/Util.java")
        .unwrap();
    let lines = util_file.lines.as_ref().unwrap();
    assert_eq!(lines.join("\n"), util.trim_end());
    assert!(ctx.stats().blobs_reused >= 1);
}

#[test]
fn test_vanished_file_gets_absence_marker_once() {
    let (_dir, path, repo) = create_test_repo();
    let calc = java_class("Calc", &[ADD]);
    let util = java_class("Util", &[SUB]);
    add_commit_at(
        &repo,
        &[("Calc.java", calc.as_str()), ("Util.java", util.as_str())],
        "initial",
        1_000,
    );
    remove_file_commit(&repo, "Util.java", "drop util", 2_000);
    add_commit_at(&repo, &[("Calc.java", "class Calc {}")], "shrink", 3_000);

    let walker = HistoryWalker::open(&path).unwrap();
    let (_, commits) = walker.plan(None, None).unwrap();
    let mut ctx = walker.snapshots(&java(), None);

    ctx.snapshot(commits[0]).unwrap();
    let removed = ctx.snapshot(commits[1]).unwrap();
    let marker = removed.files.iter().find(|f| f.path == "Util.java").unwrap();
    assert!(marker.is_deleted());

    let later = ctx.snapshot(commits[2]).unwrap();
    assert!(later.files.iter().all(|f| f.path != "Util.java"));
}

#[test]
fn test_oversized_blobs_are_skipped() {
    let (_dir, path, repo) = create_test_repo();
    let big = format!("class Big {{\n{}}}\n", "    // padding\n".repeat(200));
    add_commit_at(
        &repo,
        &[("Big.java", big.as_str()), ("Small.java", "class Small {}")],
        "initial",
        1_000,
    );

    let walker = HistoryWalker::open(&path).unwrap();
    let (_, commits) = walker.plan(None, None).unwrap();
    let mut ctx = walker.snapshots(&java(), Some(256));

    let snap = ctx.snapshot(commits[0]).unwrap();
    assert_eq!(snap.files.len(), 1);
    assert_eq!(snap.files[0].path, "Small.java");
    assert_eq!(ctx.stats().oversized, 1);
}
