// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for the spectrum pipeline hot path.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use spectrabar_core::exchange::Exchange;
use spectrabar_core::pipeline::SpectrumPipeline;
use spectrabar_core::reducer::ColumnReducer;
use spectrabar_core::render::MonoFramebuffer;
use spectrabar_core::{PipelineConfig, WindowKind};
use spectrabar_dsp::fft::RustFftTransform;

const WINDOW_LEN: usize = 512;

/// Generate a deterministic noise window using a simple LCG.
fn noise(len: usize, seed: u64) -> Vec<i16> {
    let mut state: u64 = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 48) as i16
        })
        .collect()
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_apply");
    let input = noise(WINDOW_LEN, 0xDEAD_BEEF_CAFE_BABE);

    for (name, kind) in [
        ("triangular_512", WindowKind::Triangular),
        ("hann_512", WindowKind::Hann),
    ] {
        group.bench_function(name, |b| {
            let mut buf = input.clone();
            b.iter(|| {
                buf.copy_from_slice(&input);
                kind.apply(black_box(&mut buf));
            });
        });
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_reduce");
    let re = noise(WINDOW_LEN, 0xDEAD_BEEF_CAFE_BABE);
    let im = noise(WINDOW_LEN, 0xCAFE_BABE_DEAD_BEEF);

    group.bench_function("linear_512_to_84", |b| {
        let mut reducer = ColumnReducer::new(84, WINDOW_LEN, 1, false);
        b.iter(|| {
            reducer.reduce(black_box(&re), black_box(&im));
        });
    });

    group.bench_function("decibel_512_to_84", |b| {
        let mut reducer = ColumnReducer::new(84, WINDOW_LEN, 1, true);
        b.iter(|| {
            reducer.reduce(black_box(&re), black_box(&im));
        });
    });

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_frame");
    let input = noise(WINDOW_LEN, 0xDEAD_BEEF_CAFE_BABE);

    group.bench_function("poll_frame_512", |b| {
        let config = PipelineConfig::default();
        let (mut producer, consumer) = Exchange::split(config.window_len);
        let mut pipeline = SpectrumPipeline::from_parts(
            &config,
            consumer,
            RustFftTransform::new(9),
            MonoFramebuffer::new(84, 48),
        );

        b.iter(|| {
            for &s in &input {
                producer.push(s);
            }
            pipeline.poll_frame().unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_window, bench_reduce, bench_frame);
criterion_main!(benches);
