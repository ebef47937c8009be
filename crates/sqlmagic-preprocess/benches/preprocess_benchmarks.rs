//! Benchmarks for the preprocessing hot paths
//!
//! Cells in notebooks are usually small, but generated scripts and macro
//! libraries can run to thousands of statements.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlmagic_preprocess::{
    split_statements, strip_comments, substitute_bindings, BindingsBuilder, Delimiter, MacroTable,
};

/// A script of N inserts with quoted delimiters and trailing comments
fn generate_script(num_statements: usize) -> String {
    (0..num_statements)
        .map(|i| {
            format!(
                "insert into audit values ({}, 'note; with delimiter', :user) -- row {}\n",
                i, i
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn bench_split_statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_statements");

    for num_statements in [10, 100, 1000].iter() {
        let script = strip_comments(&generate_script(*num_statements));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_statements),
            &script,
            |b, script| b.iter(|| black_box(split_statements(script, Delimiter::Semicolon))),
        );
    }

    group.finish();
}

fn bench_substitute_bindings(c: &mut Criterion) {
    let bindings = BindingsBuilder::new()
        .var("user", "O'Brien")
        .var("ids", vec![1_i64, 2, 3, 4, 5])
        .var("schema", "PAYROLL")
        .build();
    let statement = "select * from :schema.emp where empno in (:ids) and name = :name \
                     and created_by = :user and note <> ':user'";

    c.bench_function("substitute_bindings", |b| {
        b.iter(|| black_box(substitute_bindings(statement, &bindings)))
    });
}

fn bench_macro_run(c: &mut Criterion) {
    let mut table = MacroTable::new();
    let body = "\
var cmd {^1}
if {argc} == 0
exit No option provided
endif
if {cmd} == TABLES
select tabschema, tabname from syscat.tables
if {argc} > 1
where tabschema = '{^2}'
endif
return
endif
if {cmd} == COLUMNS
select colname, typename from syscat.columns where tabname = '{^2}'
else
echo Unknown option {cmd}
endif";
    // the name is static and always present
    let _ = table.define("DEFINE LIST", body);

    let mut group = c.benchmark_group("macro_run");
    for invocation in ["LIST TABLES DB2INST1", "LIST COLUMNS EMPLOYEE", "LIST BOGUS"].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(invocation), invocation, |b, inv| {
            b.iter(|| black_box(table.expand(inv)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_split_statements,
    bench_substitute_bindings,
    bench_macro_run
);
criterion_main!(benches);
