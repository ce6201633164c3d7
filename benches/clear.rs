// Run with: cargo bench --bench clear

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use ssd1306_framebuffer::{compute_pages, FrameBuffer};
use std::hint::black_box;
use std::time::Duration;

const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = compute_pages(HEIGHT);

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3))
        .confidence_level(0.95)
        .significance_level(0.05)
}

fn clear(c: &mut Criterion) {
    let mut group = c.benchmark_group("clear");
    group.throughput(Throughput::Elements((WIDTH * HEIGHT) as u64));

    group.bench_function("clear_screen", |b| {
        let mut fb = FrameBuffer::<WIDTH, HEIGHT, PAGES>::new();
        fb.set_rect(0, 0, WIDTH, HEIGHT, true);

        b.iter(|| {
            black_box(&mut fb).clear_screen();
        });
    });

    group.bench_function("draw_target_clear", |b| {
        let mut fb = FrameBuffer::<WIDTH, HEIGHT, PAGES>::new();
        fb.set_rect(0, 0, WIDTH, HEIGHT, true);

        b.iter(|| {
            black_box(&mut fb)
                .clear(black_box(BinaryColor::Off))
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(name = benches; config = configure_criterion(); targets = clear);
criterion_main!(benches);
