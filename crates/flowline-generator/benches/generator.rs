//! Benchmarks for puzzle generation.
//!
//! # Benchmarks
//!
//! - **`primary`**: the primary generator alone, on 8x8 and 15x15 grids.
//! - **`fallback`**: the fallback generator alone (primary budget of zero).
//! - **`daily`**: the full daily puzzle path for a fixed date.
//!
//! Fixed seeds keep the measurements reproducible while still covering several
//! cases per grid size.
//!
//! # Running
//!
//! ```sh
//! cargo bench --bench generator
//! ```

use std::{hint, time::Duration};

use criterion::{
    BatchSize, BenchmarkId, Criterion, PlottingBackend, criterion_group, criterion_main,
};
use flowline_generator::{
    GenerationParams, GeneratorConfig, PuzzleGenerator, PuzzleSeed, daily_puzzle,
};

const SEEDS: [u32; 3] = [42, 20_240_115, 3_735_928_559];
const SIDES: [usize; 2] = [8, 15];

fn bench_primary(c: &mut Criterion) {
    for side in SIDES {
        let params = GenerationParams::for_grid(side, side, None).unwrap();
        let generator = PuzzleGenerator::new(params);
        for (i, seed) in SEEDS.into_iter().enumerate() {
            c.bench_with_input(
                BenchmarkId::new(format!("primary_{side}x{side}"), format!("seed_{i}")),
                &PuzzleSeed::new(seed),
                |b, seed| {
                    b.iter_batched(
                        || hint::black_box(*seed),
                        |seed| generator.generate_with_seed(seed),
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
}

fn bench_fallback(c: &mut Criterion) {
    let config = GeneratorConfig {
        attempt_budget: 0,
        ..GeneratorConfig::default()
    };
    for side in SIDES {
        let params = GenerationParams::for_grid(side, side, None).unwrap();
        let generator = PuzzleGenerator::new(params).with_config(config);
        for (i, seed) in SEEDS.into_iter().enumerate() {
            c.bench_with_input(
                BenchmarkId::new(format!("fallback_{side}x{side}"), format!("seed_{i}")),
                &PuzzleSeed::new(seed),
                |b, seed| {
                    b.iter_batched(
                        || hint::black_box(*seed),
                        |seed| generator.generate_with_seed(seed),
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
}

fn bench_daily(c: &mut Criterion) {
    c.bench_function("daily", |b| {
        b.iter(|| daily_puzzle(hint::black_box("2024-01-15")).unwrap());
    });
}

criterion_group!(
    name = benches;
    config =
        Criterion::default()
            .plotting_backend(PlottingBackend::Plotters)
            .measurement_time(Duration::from_secs(12));
    targets =
        bench_primary,
        bench_fallback,
        bench_daily
);
criterion_main!(benches);
