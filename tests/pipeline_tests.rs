// End-to-end pipeline tests: git history in, feature matrix out

mod common;

use common::{
    ADD, ADD_CHECKED, NEG, SUB, add_commit_at, add_commit_by, create_test_db, create_test_repo,
    java_class, method_id,
};
use methodtrail::config::{PipelineConfig, RunPlan};
use methodtrail::model::{FeatureValue, MethodStatus};
use methodtrail::repository::{Database, HistoryError, Pipeline};

fn build_history(repo: &git2::Repository) {
    let v0 = java_class("Calc", &[ADD, SUB]);
    let v1 = java_class("Calc", &[ADD_CHECKED, SUB]);
    let v2 = java_class("Calc", &[ADD_CHECKED]);
    let v3 = java_class("Calc", &[ADD_CHECKED, NEG]);
    add_commit_at(repo, &[("src/Calc.java", v0.as_str())], "initial", 1_000);
    add_commit_at(repo, &[("src/Calc.java", v1.as_str())], "checked add", 2_000);
    add_commit_at(repo, &[("src/Calc.java", v2.as_str())], "drop sub", 3_000);
    add_commit_at(repo, &[("src/Calc.java", v3.as_str()), ("NOTES.md", "notes")], "neg", 4_000);
}

#[tokio::test]
async fn test_full_run_produces_feature_rows() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = create_test_db().await;

    let pipeline = Pipeline::quiet(&path, PipelineConfig::default());
    let matrix = pipeline.run(&db, &RunPlan::full("features")).await.unwrap();

    assert_eq!(matrix.len(), 3);
    for row in &matrix.methods {
        assert_eq!(row.values.len(), matrix.columns.len());
        assert_eq!(row.file, "src/Calc.java");
    }

    let add = method_id(&matrix, "add(");
    let sub = method_id(&matrix, "sub(");
    let neg = method_id(&matrix, "neg(");

    assert_eq!(matrix.value(add, "commits_since_last_change"), Some(&FeatureValue::Int(2)));
    assert_eq!(matrix.value(add, "existence_ratio"), Some(&FeatureValue::Float(1.0)));
    assert_eq!(matrix.value(add, "time_since_last_change"), Some(&FeatureValue::Int(2_000)));
    assert_eq!(matrix.value(sub, "length"), Some(&FeatureValue::Int(0)));
    assert_eq!(
        matrix.value(sub, "change[9]"),
        Some(&FeatureValue::Int(MethodStatus::Deleted.code()))
    );
    assert_eq!(
        matrix.value(neg, "change[9]"),
        Some(&FeatureValue::Int(MethodStatus::Added.code()))
    );
    assert_eq!(matrix.value(neg, "existence_ratio"), Some(&FeatureValue::Float(0.25)));
}

#[tokio::test]
async fn test_second_run_is_served_from_store() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = create_test_db().await;
    let pipeline = Pipeline::quiet(&path, PipelineConfig::default());
    let plan = RunPlan::full("features");

    let first = pipeline.run(&db, &plan).await.unwrap();
    let key = db.get_run_key("features").await;
    assert!(key.is_some());

    let second = pipeline.run(&db, &plan).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(db.get_run_key("features").await, key);

    // A new commit changes the tip and invalidates the stored run
    let grown = java_class("Calc", &[ADD_CHECKED, NEG, SUB]);
    add_commit_at(&repo, &[("src/Calc.java", grown.as_str())], "sub again", 5_000);
    let third = pipeline.run(&db, &plan).await.unwrap();
    assert_ne!(db.get_run_key("features").await, key);
    assert_eq!(third.len(), 3);
    let sub = method_id(&third, "sub(");
    assert_eq!(
        third.value(sub, "change[9]"),
        Some(&FeatureValue::Int(MethodStatus::Added.code()))
    );
}

#[tokio::test]
async fn test_settings_are_part_of_the_cache_key() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = create_test_db().await;
    let plan = RunPlan::full("features");

    let wide = Pipeline::quiet(&path, PipelineConfig::default())
        .run(&db, &plan)
        .await
        .unwrap();
    let narrow_config = PipelineConfig {
        history_capacity: 2,
        ..PipelineConfig::default()
    };
    let narrow = Pipeline::quiet(&path, narrow_config)
        .run(&db, &plan)
        .await
        .unwrap();

    assert_eq!(wide.columns.len() - narrow.columns.len(), 16);
}

#[tokio::test]
async fn test_windowed_plans_cover_their_ranges() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = create_test_db().await;
    let pipeline = Pipeline::quiet(&path, PipelineConfig::default());

    let plans = RunPlan::windows(4, 1, 2);
    let (test_plan, result_plan) = &plans[0];
    let test = pipeline.run(&db, test_plan).await.unwrap();
    let result = pipeline.run(&db, result_plan).await.unwrap();

    // test0 stops before `neg` exists
    assert_eq!(test.len(), 2);
    assert_eq!(result.len(), 3);
    assert_eq!(
        db.list_runs().await.unwrap(),
        vec!["result0".to_string(), "test0".to_string()]
    );
}

#[tokio::test]
async fn test_missing_branch_is_fatal() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = create_test_db().await;
    let config = PipelineConfig {
        branch: Some("nope".to_string()),
        ..PipelineConfig::default()
    };

    let err = Pipeline::quiet(&path, config)
        .run(&db, &RunPlan::full("features"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HistoryError>(),
        Some(HistoryError::BranchNotFound(_))
    ));
}

#[tokio::test]
async fn test_over_large_commits_are_skipped() {
    let (_dir, path, repo) = create_test_repo();
    let calc = java_class("Calc", &[ADD]);
    let util = java_class("Util", &[SUB]);
    add_commit_at(&repo, &[("Calc.java", calc.as_str())], "one file", 1_000);
    add_commit_at(&repo, &[("Util.java", util.as_str())], "two files", 2_000);

    let config = PipelineConfig {
        max_files_per_commit: Some(1),
        ..PipelineConfig::default()
    };
    let db = create_test_db().await;
    let matrix = Pipeline::quiet(&path, config)
        .run(&db, &RunPlan::full("features"))
        .await
        .unwrap();

    assert_eq!(matrix.len(), 1);
    let add = method_id(&matrix, "add(");
    assert_eq!(matrix.value(add, "existence_ratio"), Some(&FeatureValue::Float(1.0)));
}

#[tokio::test]
async fn test_written_outputs() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = Database::in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    let out = tempfile::TempDir::new().unwrap();

    let matrix = Pipeline::quiet(&path, PipelineConfig::default())
        .run(&db, &RunPlan::full("features"))
        .await
        .unwrap();

    let text_path = matrix.write_text(&out.path().join("data"), "features").unwrap();
    let text = std::fs::read_to_string(&text_path).unwrap();
    assert_eq!(text, matrix.to_text());
    assert!(text.starts_with("0, "));

    let json_path = matrix.write_json(out.path(), "features").unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(json["methods"].as_array().unwrap().len(), 3);
    assert_eq!(json["columns"][0], "signature_id");
}

#[tokio::test]
async fn test_full_run_records_commit_sizes() {
    let (_dir, path, repo) = create_test_repo();
    build_history(&repo);
    let db = create_test_db().await;

    let pipeline = Pipeline::quiet(&path, PipelineConfig::default());
    let matrix = pipeline.run(&db, &RunPlan::full("features")).await.unwrap();

    let timestamps: Vec<i64> = matrix.commits.iter().map(|c| c.timestamp).collect();
    assert_eq!(timestamps, vec![1_000, 2_000, 3_000, 4_000]);
    let v3 = java_class("Calc", &[ADD_CHECKED, NEG]);
    assert_eq!(matrix.commits[3].lines, v3.lines().count());
    assert!(matrix.commits.iter().all(|c| c.author == "Test User"));

    let cached = pipeline.run(&db, &RunPlan::full("features")).await.unwrap();
    assert_eq!(cached.commits, matrix.commits);
}

#[test]
fn test_run_by_author_splits_history() {
    let (_dir, path, repo) = create_test_repo();
    let v0 = java_class("Calc", &[ADD]);
    let v1 = java_class("Calc", &[ADD, SUB]);
    add_commit_by(&repo, "Ann", &[("src/Calc.java", v0.as_str())], "add", 1_000);
    add_commit_by(&repo, "Bob", &[("src/Calc.java", v1.as_str())], "sub", 2_000);

    let pipeline = Pipeline::quiet(&path, PipelineConfig::default());
    let by_author = pipeline.run_by_author(&RunPlan::full("features")).unwrap();

    assert_eq!(by_author.len(), 2);
    let ann = &by_author["Ann"];
    let bob = &by_author["Bob"];
    assert_eq!(ann.len(), 1);
    assert_eq!(bob.len(), 2);
    assert_eq!(ann.commits.len(), 1);
    assert_eq!(bob.commits[0].timestamp, 2_000);

    let sub = method_id(bob, "sub(");
    assert_eq!(bob.value(sub, "existence_ratio"), Some(&FeatureValue::Float(1.0)));
}
