use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wautomata::{
    algos::{determinize, factories::ladybird, minimize},
    context::Context,
    labelset::Letters,
    options::QuotientAlgo,
    weightset::B,
};

fn subset_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinize ladybird");
    for n in [4, 8, 12] {
        let aut = ladybird(Context::new(Letters::new("abc"), B), n).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &aut, |b, aut| {
            b.iter(|| determinize(black_box(aut), false).unwrap())
        });
    }
    group.finish();
}

fn minimization(c: &mut Criterion) {
    let det = determinize(&ladybird(Context::new(Letters::new("abc"), B), 10).unwrap(), false).unwrap();
    let mut group = c.benchmark_group("minimize ladybird");
    for algo in [QuotientAlgo::Moore, QuotientAlgo::Hopcroft] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{algo:?}")), &det, |b, aut| {
            b.iter(|| minimize(black_box(aut), algo, false).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, subset_construction, minimization);
criterion_main!(benches);
