use std::collections::BTreeMap;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId,
    Criterion,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rb_map::RbMap;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

// Same operations on both maps, so the numbers line up per scenario.
macro_rules! bench_both {
    ($g:ident, $snd:literal, $setup:expr, |$map:ident, $k:ident| $body:expr) => {
        $g.bench_function(BenchmarkId::new("rb_map", $snd), |b| {
            b.iter_batched(
                || ($setup, RbMap::new()),
                |(keys, mut $map): (Vec<u64>, RbMap<u64, u64>)| {
                    for $k in keys {
                        black_box($body);
                    }
                    $map
                },
                BatchSize::LargeInput,
            )
        });
        $g.bench_function(BenchmarkId::new("btree_map", $snd), |b| {
            b.iter_batched(
                || ($setup, BTreeMap::new()),
                |(keys, mut $map): (Vec<u64>, BTreeMap<u64, u64>)| {
                    for $k in keys {
                        black_box($body);
                    }
                    $map
                },
                BatchSize::LargeInput,
            )
        });
    };
}

fn bench_map(c: &mut Criterion) {
    let _ = TermLogger::init(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let mut group = c.benchmark_group("ordered_map");
    let mut rng = ChaCha20Rng::from_seed([
        0x2B, 0x7E, 0x15, 0x16, 0x28, 0xAE, 0xD2, 0xA6, 0xAB, 0xF7, 0x15, 0x88,
        0x09, 0xCF, 0x4F, 0x3C, 0x76, 0x2E, 0x71, 0x60, 0xF3, 0x8B, 0x4D, 0xA5,
        0x6A, 0x78, 0x4D, 0x90, 0x45, 0x19, 0x0C, 0xFE,
    ]);
    let len = 10_u64.pow(5);
    let seq: Vec<_> = (0..len).collect();
    let shuffled = {
        let mut tmp = seq.clone();
        tmp.shuffle(&mut rng);
        tmp
    };

    bench_both! { group, "insert-seq", seq.clone(), |map, k| map.insert(k, 5 * k) }
    bench_both! { group, "insert-rand", shuffled.clone(), |map, k| map.insert(k, 5 * k) }

    let rb: RbMap<_, _> = seq.iter().map(|&k| (k, 5 * k)).collect();
    let bt: BTreeMap<_, _> = seq.iter().map(|&k| (k, 5 * k)).collect();
    group
        .bench_function(BenchmarkId::new("rb_map", "lookup-rand"), |b| {
            b.iter(|| {
                for k in &shuffled {
                    black_box(rb.lookup(k).ok());
                }
            })
        })
        .bench_function(BenchmarkId::new("btree_map", "lookup-rand"), |b| {
            b.iter(|| {
                for k in &shuffled {
                    black_box(bt.get(k));
                }
            })
        });

    group
        .bench_function(BenchmarkId::new("rb_map", "remove-rand"), |b| {
            b.iter_batched(
                || rb.clone(),
                |mut map| {
                    for k in &shuffled {
                        black_box(map.remove(k));
                    }
                    map
                },
                BatchSize::LargeInput,
            )
        })
        .bench_function(BenchmarkId::new("btree_map", "remove-rand"), |b| {
            b.iter_batched(
                || bt.clone(),
                |mut map| {
                    for k in &shuffled {
                        black_box(map.remove(k));
                    }
                    map
                },
                BatchSize::LargeInput,
            )
        });

    group.finish();
}

criterion_group!(benches, bench_map);
criterion_main!(benches);
