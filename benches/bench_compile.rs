use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use graphschema::{
    ColumnDescriptor, GraphSchema, MigrationPlan, SemanticType, TableKind, TableSchema,
    compile_table, diff,
};

const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

fn bench_scales() -> &'static [usize] {
    &[10, 100, 500]
}

fn wide_columns(width: usize) -> Vec<ColumnDescriptor> {
    const TYPES: [SemanticType; 4] = [
        SemanticType::Int64,
        SemanticType::String,
        SemanticType::Double,
        SemanticType::Timestamp,
    ];
    let mut columns = vec![ColumnDescriptor::new("id", SemanticType::Int64).identifier()];
    for i in 0..width {
        let mut column = ColumnDescriptor::new(format!("c{i}"), TYPES[i % TYPES.len()].clone());
        if i % 3 == 0 {
            column = column.nullable();
        }
        if i % 7 == 0 {
            column = column.indexed();
        }
        columns.push(column);
    }
    columns
}

/// `tables` node tables chained by edge tables, each node `width` columns wide.
fn chain_schema(tables: usize, width: usize) -> GraphSchema {
    let mut schema = GraphSchema::new();
    for i in 0..tables {
        let node = TableSchema::node(format!("N{i}"), wide_columns(width)).expect("node");
        schema.insert(node).expect("insert node");
    }
    for i in 1..tables {
        let edge = TableSchema::edge(
            format!("E{i}"),
            format!("N{}", i - 1),
            format!("N{i}"),
            vec![ColumnDescriptor::new("weight", SemanticType::Double).nullable()],
        )
        .expect("edge");
        schema.insert(edge).expect("insert edge");
    }
    schema
}

fn bench_compile_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_table");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for &width in bench_scales() {
        let columns = wide_columns(width);
        group.bench_function(BenchmarkId::from_parameter(width), |b| {
            b.iter(|| {
                let compiled =
                    compile_table("Wide", columns.clone(), TableKind::Node).expect("compile");
                black_box(compiled);
            });
        });
    }
    group.finish();
}

fn bench_diff_and_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_and_plan");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for &tables in bench_scales() {
        let current = chain_schema(tables, 8);
        let mut target = chain_schema(tables, 8);
        // Rebuild every other node table so dependent edges are planned too.
        for i in (0..tables).step_by(2) {
            let name = format!("N{i}");
            let node = TableSchema::node(name.clone(), wide_columns(9)).expect("node");
            target.nodes.insert(name, node);
        }
        group.bench_function(BenchmarkId::from_parameter(tables), |b| {
            b.iter(|| {
                let diff = diff(&current, &target);
                let plan = MigrationPlan::build(&current, &target, &diff);
                black_box(plan.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile_table, bench_diff_and_plan);
criterion_main!(benches);
