//! Top-K Selection Benchmarks
//!
//! Measures epoch snapshot cost as the eligible set grows.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dlp_root::dlp_core::constants::ONE_TOKEN;
use dlp_root::TopKSelector;

fn stake_of(dlp_id: u64) -> u128 {
    // Spread with collisions so tie-breaks are exercised
    ((dlp_id * 7_919) % 1_000) as u128 * ONE_TOKEN
}

fn top_dlps_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_dlps");

    for eligible in [100u64, 500, 2_000] {
        group.throughput(Throughput::Elements(eligible));
        for limit in [16usize, 64] {
            group.bench_with_input(
                BenchmarkId::new(format!("select_{limit}"), eligible),
                &eligible,
                |b, &eligible| {
                    b.iter(|| {
                        let mut selector = TopKSelector::new(limit);
                        for dlp_id in 1..=eligible {
                            selector.offer(dlp_id, stake_of(dlp_id));
                        }
                        std::hint::black_box(selector.finish())
                    })
                },
            );
        }

        group.bench_with_input(BenchmarkId::new("full_sort", eligible), &eligible, |b, &eligible| {
            b.iter(|| {
                let mut all: Vec<(u64, u128)> = (1..=eligible).map(|id| (id, stake_of(id))).collect();
                all.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                all.truncate(64);
                std::hint::black_box(all)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, top_dlps_benchmarks);
criterion_main!(benches);
