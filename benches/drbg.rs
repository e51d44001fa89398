//! Benchmarks for the DRBG and lamp generation cycle.
//!
//! Measures raw HMAC-DRBG throughput at several request sizes, the cost of
//! a full lamp cycle (diffusion, render, sample, whiten, reseed, generate)
//! and the pool fan-out across lamp counts.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lava_entropy::drbg::HmacDrbg;
use lava_entropy::lamp::{LampConfig, LampInstance, LampServices, NullSink};
use lava_entropy::noise::{ManualClock, SeededNoise};
use lava_entropy::pool::{LampPool, LampSelection, PoolConfig};

/// Bytes requested per generation in the lamp and pool benchmarks.
const REQUEST_BYTES: usize = 32;

fn bench_services() -> LampServices {
    LampServices {
        noise: Arc::new(SeededNoise::from_seed([0xA5; 32])),
        clock: Arc::new(ManualClock::ticking(Duration::from_millis(16))),
        sink: Arc::new(NullSink),
    }
}

/// Benchmarks `HmacDrbg::generate()` across request sizes.
fn bench_drbg_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("drbg_generate");

    for size in [32usize, 256, 4096] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut drbg = HmacDrbg::new(&[0u8; 32]);
            b.iter(|| black_box(drbg.generate(black_box(size))));
        });
    }

    group.finish();
}

/// Benchmarks one `mix_and_generate()` cycle at the default canvas size.
fn bench_lamp_cycle(c: &mut Criterion) {
    let config = LampConfig {
        snapshot_interval: 0,
        ..Default::default()
    };
    let lamp = LampInstance::new(0, &config, b"bench", &bench_services());

    c.bench_function("lamp_cycle_256x192", |b| {
        b.iter(|| black_box(lamp.mix_and_generate(REQUEST_BYTES).unwrap()));
    });
}

/// Benchmarks `combined_random()` scaling with lamp count.
fn bench_pool_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_combined_random");
    group.sample_size(20);

    for lamps in [1u32, 4, 10] {
        let config = PoolConfig {
            lamps,
            lamp: LampConfig {
                snapshot_interval: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let pool = LampPool::from_config(&config, &bench_services());

        group.bench_with_input(BenchmarkId::new("lamps", lamps), &pool, |b, pool| {
            b.iter(|| black_box(pool.combined_random(REQUEST_BYTES, LampSelection::All).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_drbg_generate, bench_lamp_cycle, bench_pool_scaling);
criterion_main!(benches);
