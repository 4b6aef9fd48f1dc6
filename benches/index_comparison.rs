//! Head-to-head benchmarks for the two index structures.
//!
//! Runs identical workloads against the balanced binary index and the
//! multiway leaf-chain index at several degrees, so structural trade-offs
//! (rotation cost vs node fan-out, point lookup vs range scan) show up in
//! the same report.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use filedex::pure::{btree, rbtree};
use filedex::{ValidatedDegree, ValidatedFileName, ValidatedPath};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const SIZES: &[usize] = &[100, 1_000, 10_000];

fn dataset(count: usize) -> Vec<(ValidatedFileName, ValidatedPath)> {
    let mut rng = StdRng::seed_from_u64(0xbe9c);
    let mut entries: Vec<(ValidatedFileName, ValidatedPath)> = (0..count)
        .map(|i| {
            let key = ValidatedFileName::new(format!("file_{i:06}.dat"))
                .expect("generated filename is valid");
            let value = ValidatedPath::new(format!("/data/shard_{}/file_{i:06}.dat", i % 16))
                .expect("generated path is valid");
            (key, value)
        })
        .collect();
    entries.shuffle(&mut rng);
    entries
}

fn degree(t: usize) -> ValidatedDegree {
    ValidatedDegree::new(t).expect("bench degree is valid")
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &size in SIZES {
        let entries = dataset(size);

        group.bench_with_input(BenchmarkId::new("balanced", size), &entries, |b, entries| {
            b.iter(|| {
                let mut tree = rbtree::create_empty_tree();
                for (key, value) in entries {
                    rbtree::insert_into_tree(&mut tree, key.clone(), value.clone());
                }
                black_box(tree.len())
            })
        });

        for t in [3usize, 16, 64] {
            group.bench_with_input(
                BenchmarkId::new(format!("multiway_t{t}"), size),
                &entries,
                |b, entries| {
                    b.iter(|| {
                        let mut tree = btree::create_tree(degree(t));
                        for (key, value) in entries {
                            btree::insert_into_tree(&mut tree, key.clone(), value.clone());
                        }
                        black_box(tree.len())
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for &size in SIZES {
        let entries = dataset(size);
        let lookup_keys: Vec<ValidatedFileName> =
            entries.iter().step_by(7).map(|(k, _)| k.clone()).collect();

        let mut rb = rbtree::create_empty_tree();
        let mut bp = btree::create_tree(degree(16));
        for (key, value) in &entries {
            rbtree::insert_into_tree(&mut rb, key.clone(), value.clone());
            btree::insert_into_tree(&mut bp, key.clone(), value.clone());
        }

        group.bench_with_input(BenchmarkId::new("balanced", size), &lookup_keys, |b, lookup_keys| {
            b.iter(|| {
                for key in lookup_keys {
                    black_box(rbtree::search_in_tree(&rb, key));
                }
            })
        });
        group.bench_with_input(
            BenchmarkId::new("multiway_t16", size),
            &lookup_keys,
            |b, lookup_keys| {
                b.iter(|| {
                    for key in lookup_keys {
                        black_box(btree::search_in_tree(&bp, key));
                    }
                })
            },
        );
    }
    group.finish();
}

fn bench_range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_scan");
    for &size in SIZES {
        let entries = dataset(size);
        let mut bp = btree::create_tree(degree(16));
        let mut rb = rbtree::create_empty_tree();
        for (key, value) in &entries {
            btree::insert_into_tree(&mut bp, key.clone(), value.clone());
            rbtree::insert_into_tree(&mut rb, key.clone(), value.clone());
        }

        let start = ValidatedFileName::new(format!("file_{:06}.dat", size / 4))
            .expect("bench key is valid");
        let end = ValidatedFileName::new(format!("file_{:06}.dat", 3 * size / 4))
            .expect("bench key is valid");

        // Leaf-chain walk vs filtering a full in-order traversal
        group.bench_function(BenchmarkId::new("multiway_chain", size), |b| {
            b.iter(|| black_box(btree::range_scan(&bp, &start, &end)))
        });
        group.bench_function(BenchmarkId::new("balanced_filtered", size), |b| {
            b.iter(|| {
                let matched: Vec<_> = rbtree::extract_all_pairs(&rb)
                    .into_iter()
                    .filter(|(k, _)| k >= &start && k <= &end)
                    .collect();
                black_box(matched)
            })
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    for &size in SIZES {
        let entries = dataset(size);

        group.bench_with_input(BenchmarkId::new("balanced", size), &entries, |b, entries| {
            b.iter_batched(
                || {
                    let mut tree = rbtree::create_empty_tree();
                    for (key, value) in entries {
                        rbtree::insert_into_tree(&mut tree, key.clone(), value.clone());
                    }
                    tree
                },
                |mut tree| {
                    for (key, _) in entries {
                        rbtree::delete_from_tree(&mut tree, key);
                    }
                    black_box(tree.len())
                },
                criterion::BatchSize::SmallInput,
            )
        });

        group.bench_with_input(
            BenchmarkId::new("multiway_t16", size),
            &entries,
            |b, entries| {
                b.iter_batched(
                    || {
                        let mut tree = btree::create_tree(degree(16));
                        for (key, value) in entries {
                            btree::insert_into_tree(&mut tree, key.clone(), value.clone());
                        }
                        tree
                    },
                    |mut tree| {
                        for (key, _) in entries {
                            btree::delete_from_tree(&mut tree, key);
                        }
                        black_box(tree.len())
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_search,
    bench_range_scan,
    bench_delete
);
criterion_main!(benches);
