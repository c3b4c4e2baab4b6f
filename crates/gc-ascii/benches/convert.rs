use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use gc_core::frame::PixelGrid;
use gc_core::options::OptionValues;

fn test_frame(w: u32, h: u32) -> PixelGrid {
    PixelGrid::from_fn_rgb(w, h, |x, y| {
        let v = ((x ^ y) & 0xFF) as u8;
        (v, v.wrapping_mul(3), 255 - v)
    })
    .unwrap_or_else(|e| panic!("{e}"))
}

fn bench_converters(c: &mut Criterion) {
    let frame = test_frame(640, 360);
    let values = OptionValues::new();
    let mut group = c.benchmark_group("convert_640x360");
    for descriptor in gc_ascii::list_converters() {
        group.bench_with_input(
            BenchmarkId::from_parameter(descriptor.id),
            &frame,
            |b, frame| {
                b.iter(|| gc_ascii::convert(descriptor.id, black_box(frame), &values));
            },
        );
    }
    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let frame = test_frame(1920, 1080);
    c.bench_function("resample_1080p_to_200x60", |b| {
        b.iter(|| gc_ascii::resample(black_box(&frame), 200, 60));
    });
}

criterion_group!(benches, bench_converters, bench_resample);
criterion_main!(benches);
