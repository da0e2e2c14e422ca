use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ordered_btree::BTree;
use std::collections::BTreeSet;

criterion_group!(
    benches,
    bench_insert,
    bench_search,
    bench_ref_iter,
    bench_delete,
    bench_degree
);
criterion_main!(benches);

/// Keys `0..n` in a scattered order.
fn keys(n: usize) -> impl Iterator<Item = usize> {
    (0..n).map(move |i| (i * 7919) % n)
}

fn exp_tree(n: usize, t: usize) -> BTree<usize> {
    let mut tree = BTree::ordered(t).unwrap();
    for i in keys(n) {
        tree.insert(i).unwrap();
    }
    tree
}

fn std_set(n: usize) -> BTreeSet<usize> {
    keys(n).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert");
    for n in [1000, 10000].iter() {
        let n = *n;
        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| exp_tree(n, ordered_btree::DEFAULT_DEGREE))
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| b.iter(|| std_set(n)));
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Search");
    for n in [50, 100, 200, 500, 1000].iter() {
        let n = *n;
        let exp = exp_tree(n, ordered_btree::DEFAULT_DEGREE);
        let std = std_set(n);

        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| {
                for i in 0..n {
                    assert!(exp.search(&i) == Some(&i));
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                for i in 0..n {
                    assert!(std.get(&i) == Some(&i));
                }
            })
        });
    }
    group.finish();
}

fn bench_ref_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("RefIter");
    for n in [100, 1000, 10000, 100000].iter() {
        let n = *n;
        let exp = exp_tree(n, ordered_btree::DEFAULT_DEGREE);
        let std = std_set(n);

        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| {
                for (i, k) in exp.iter().enumerate() {
                    assert!(i == *k);
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                for (i, k) in std.iter().enumerate() {
                    assert!(i == *k);
                }
            })
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delete");
    for n in [1000, 10000].iter() {
        let n = *n;
        group.bench_function(BenchmarkId::new("Exp", n), |b| {
            b.iter(|| {
                let mut tree = exp_tree(n, ordered_btree::DEFAULT_DEGREE);
                for i in 0..n {
                    assert!(tree.delete(&i).is_some());
                }
            })
        });
        group.bench_function(BenchmarkId::new("Std", n), |b| {
            b.iter(|| {
                let mut set = std_set(n);
                for i in 0..n {
                    assert!(set.remove(&i));
                }
            })
        });
    }
    group.finish();
}

fn bench_degree(c: &mut Criterion) {
    let mut group = c.benchmark_group("Degree");
    let n = 10000;
    for t in [2, 4, 8, 16, 32].iter() {
        group.bench_function(BenchmarkId::new("Insert", t), |b| b.iter(|| exp_tree(n, *t)));
    }
    group.finish();
}

use mimalloc::MiMalloc;
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
