//! Planner benchmarks.
//!
//! Measures graph analysis and full planning over synthetic schemas shaped
//! like a wide tree of one-to-many relationships with a few self-references.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docshift_core::schema::{Column, ForeignKey, Index, Table};
use docshift_core::{ChoiceSet, MigrationPlanner, PlannerConfig, RelationshipGraph};

/// Build `size` tables where table `i` references table `(i - 1) / 3`.
fn synthetic_schema(size: usize) -> Vec<Table> {
    (0..size)
        .map(|i| {
            let name = format!("t{i}");
            let mut table = Table::new(&name)
                .with_column(Column::new("id", "bigint"))
                .with_column(Column::new("label", "varchar(64)"))
                .with_primary_key(["id"])
                .with_index(Index::new(format!("{name}_label_idx"), ["label"]))
                .with_stats(100 * (i as u64 + 1), 8_000 * (i as u64 + 1));

            if i > 0 {
                let parent = format!("t{}", (i - 1) / 3);
                table = table
                    .with_column(Column::new("parent_id", "bigint"))
                    .with_foreign_key(ForeignKey::new(format!("{name}_parent"), "parent_id", parent, "id"));
            }
            if i % 10 == 0 {
                table = table
                    .with_column(Column::nullable("previous_id", "bigint"))
                    .with_foreign_key(ForeignKey::new(format!("{name}_previous"), "previous_id", &name, "id"));
            }
            table
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner/analyze");

    for size in [10, 100, 1000] {
        let tables = synthetic_schema(size);
        group.bench_with_input(BenchmarkId::new("graph", size), &tables, |b, tables| {
            b.iter(|| {
                let graph = RelationshipGraph::new(tables);
                black_box(graph.detect_cycles());
                black_box(graph.join_tables(tables));
            });
        });
    }

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner/plan");

    for size in [10, 100, 1000] {
        let planner = MigrationPlanner::new(
            synthetic_schema(size),
            PlannerConfig::default().with_auto_suggest(),
        );
        let choices = ChoiceSet::new();

        group.bench_with_input(BenchmarkId::new("auto", size), &size, |b, _| {
            b.iter(|| black_box(planner.plan(&choices).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_plan);
criterion_main!(benches);
