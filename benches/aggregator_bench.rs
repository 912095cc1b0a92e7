// Commit-cycle aggregator benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use methodtrail::engine::MethodsAggregator;
use methodtrail::engine::collectors::default_collectors;
use methodtrail::parse::JavaParser;
use std::hint::black_box;

mod common;

fn bench_process_commits(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator_process");
    group.sample_size(10);
    for files in [5, 20] {
        let history = common::generate_history(20, files, 30);
        group.bench_with_input(BenchmarkId::new("files", files), &history, |b, history| {
            b.iter(|| {
                let mut agg = MethodsAggregator::new(
                    JavaParser::new().unwrap(),
                    default_collectors(10),
                );
                for commit in history {
                    agg.process_commit(commit).unwrap();
                }
                black_box(agg.finish())
            });
        });
    }
    group.finish();
}

fn bench_finish(c: &mut Criterion) {
    let history = common::generate_history(20, 20, 30);
    let mut agg = MethodsAggregator::new(JavaParser::new().unwrap(), default_collectors(10));
    for commit in &history {
        agg.process_commit(commit).unwrap();
    }

    c.bench_function("aggregator_finish_600_methods", |b| {
        b.iter(|| black_box(agg.finish()));
    });
}

fn bench_java_parse(c: &mut Criterion) {
    use methodtrail::parse::SourceParser;

    let mut parser = JavaParser::new().unwrap();
    let class = common::generate_class("Big", 200, 0);
    c.bench_function("java_parse_200_methods", |b| {
        b.iter(|| black_box(parser.parse("Big.java", &class).unwrap()));
    });
}

criterion_group!(benches, bench_process_commits, bench_finish, bench_java_parse);
criterion_main!(benches);
