use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fluentsql::{
    Columns, Database, Dialect, Filters, Offline, Op, SortOrder, Table, UpdateValues,
};

const DIALECTS: [Dialect; 4] = [
    Dialect::Mssql,
    Dialect::Mssql2005,
    Dialect::Mysql,
    Dialect::Postgres,
];

/// `n` predicates on `n` selected columns.
fn wide_filter(table: &Table, n: usize) -> (Columns, Filters) {
    let names: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let filters = refs
        .iter()
        .enumerate()
        .fold(Filters::new(), |f, (i, col)| f.add_on(table, col, Op::Eq, i as i64));
    (table.columns(&refs), filters)
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/select");

    for dialect in DIALECTS {
        let db = Database::offline(dialect);
        let t = Table::aliased("users", "u");
        for n in [1, 10, 50] {
            let (columns, filters) = wide_filter(&t, n);
            let id = BenchmarkId::new(dialect.name(), n);
            group.bench_with_input(id, &n, |b, _| {
                b.iter(|| {
                    let q = db
                        .select(columns.clone())
                        .from(t.clone())
                        .filter(filters.clone())
                        .order_by(t.sort(SortOrder::Asc, &["col0"]))
                        .limit(20, 10)
                        .build();
                    black_box(q)
                });
            });
        }
    }

    group.finish();
}

fn bench_combinators(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/combinators");
    let db: Database<Offline> = Database::offline(Dialect::Postgres);
    let t = Table::new("t");

    for depth in [2, 8, 32] {
        let filter = (1..depth).fold(
            fluentsql::Filter::from(Filters::new().eq("a", 0)),
            |acc, i| {
                if i % 2 == 0 {
                    acc & Filters::new().gt("a", i)
                } else {
                    acc | !fluentsql::Filter::from(Filters::new().like("b", "x"))
                }
            },
        );
        group.bench_with_input(BenchmarkId::from_parameter(depth), &filter, |b, filter| {
            b.iter(|| {
                black_box(
                    db.select(t.columns(&["a"]))
                        .from(t.clone())
                        .filter(filter.clone())
                        .build(),
                )
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/update");
    let db = Database::offline(Dialect::Mysql);

    for n in [1, 10, 100] {
        let values = (0..n).fold(UpdateValues::new(), |v, i| v.set(format!("col{i}"), i));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                black_box(
                    db.update("t")
                        .set(values.clone())
                        .filter(Filters::new().eq("id", 1))
                        .build(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_combinators, bench_update);
criterion_main!(benches);
