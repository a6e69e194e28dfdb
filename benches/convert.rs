use criterion::{Criterion, criterion_group, criterion_main};

use std::hint::black_box;
use vpx_frame::{HeapAlloc, ImageBuffer, ImageFormat, rgb_to_yuv420, yuv420_to_rgba};

const IMAGE_WIDTH: u32 = 1920;
const IMAGE_HEIGHT: u32 = 1080;

fn run_benchmarks(c: &mut Criterion) {
    let mut image =
        ImageBuffer::create(&HeapAlloc, ImageFormat::I420, IMAGE_WIDTH, IMAGE_HEIGHT, 16).unwrap();

    let rgb = vec![0x7fu8; (IMAGE_WIDTH * IMAGE_HEIGHT * 3) as usize];
    let mut rgba = vec![0u8; (IMAGE_WIDTH * IMAGE_HEIGHT * 4) as usize];

    c.bench_function("RGB to YUV 4:2:0", |b| {
        b.iter(|| {
            rgb_to_yuv420(
                black_box(&rgb),
                black_box(&mut image),
                IMAGE_WIDTH,
                IMAGE_HEIGHT,
            )
            .unwrap();
        })
    });

    c.bench_function("YUV 4:2:0 to RGBA", |b| {
        b.iter(|| {
            yuv420_to_rgba(black_box(&image), black_box(&mut rgba)).unwrap();
        })
    });
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
