use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flat_wavl::{FlatOrderedMap, HandleOrderedMap};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

type Entry = (i64, i64);

fn key(entry: &Entry) -> &i64 {
    &entry.0
}

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn patterns() -> [(&'static str, Vec<i64>); 3] {
    [("ordered", ordered_keys(N)), ("reverse", reverse_ordered_keys(N)), ("random", random_keys(N))]
}

fn flat_map(keys: &[i64]) -> FlatOrderedMap<Entry, i64> {
    let mut map = FlatOrderedMap::new(key);
    map.extend(keys.iter().map(|&k| (k, k)));
    map
}

fn handle_map(keys: &[i64]) -> HandleOrderedMap<Entry, i64> {
    let mut map = HandleOrderedMap::new(key);
    map.extend(keys.iter().map(|&k| (k, k)));
    map
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion) {
    for (pattern, keys) in patterns() {
        let mut group = c.benchmark_group(format!("map_insert_{pattern}"));

        group.bench_function(BenchmarkId::new("FlatOrderedMap", N), |b| {
            b.iter(|| flat_map(&keys));
        });

        group.bench_function(BenchmarkId::new("HandleOrderedMap", N), |b| {
            b.iter(|| handle_map(&keys));
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>());
        });

        group.finish();
    }
}

fn bench_map_get(c: &mut Criterion) {
    for (pattern, keys) in patterns() {
        let flat = flat_map(&keys);
        let handle = handle_map(&keys);
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

        let mut group = c.benchmark_group(format!("map_get_{pattern}"));

        group.bench_function(BenchmarkId::new("FlatOrderedMap", N), |b| {
            b.iter(|| keys.iter().filter_map(|k| flat.get(k)).map(|e| e.1).sum::<i64>());
        });

        group.bench_function(BenchmarkId::new("HandleOrderedMap", N), |b| {
            b.iter(|| keys.iter().filter_map(|k| handle.get(k)).map(|e| e.1).sum::<i64>());
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| keys.iter().filter_map(|k| bt_map.get(k)).sum::<i64>());
        });

        group.finish();
    }
}

fn bench_map_remove(c: &mut Criterion) {
    for (pattern, keys) in patterns() {
        let flat = flat_map(&keys);
        let handle = handle_map(&keys);
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

        let mut group = c.benchmark_group(format!("map_remove_{pattern}"));

        group.bench_function(BenchmarkId::new("FlatOrderedMap", N), |b| {
            b.iter_batched(
                || flat.clone(),
                |mut map| {
                    for k in &keys {
                        black_box(map.remove(k));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("HandleOrderedMap", N), |b| {
            b.iter_batched(
                || handle.clone(),
                |mut map| {
                    for k in &keys {
                        black_box(map.remove(k));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || bt_map.clone(),
                |mut map| {
                    for k in &keys {
                        black_box(map.remove(k));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.finish();
    }
}

fn bench_map_iter(c: &mut Criterion) {
    let keys = random_keys(N);
    let flat = flat_map(&keys);
    let handle = handle_map(&keys);
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_iter");

    group.bench_function(BenchmarkId::new("FlatOrderedMap", N), |b| {
        b.iter(|| flat.iter().map(|e| e.1).sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("HandleOrderedMap", N), |b| {
        b.iter(|| handle.iter().map(|e| e.1).sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.values().sum::<i64>());
    });

    group.finish();
}

criterion_group!(map_insert_benches, bench_map_insert);

criterion_group!(map_get_benches, bench_map_get);

criterion_group!(map_remove_benches, bench_map_remove);

criterion_group!(map_iter_benches, bench_map_iter);

criterion_main!(map_insert_benches, map_get_benches, map_remove_benches, map_iter_benches);
