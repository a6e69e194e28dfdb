use rand::Rng;
use vpx_frame::{HeapAlloc, ImageBuffer, ImageFormat, rgb_to_yuv420, yuv420_to_rgba};

fn constant_rgb(r: u8, g: u8, b: u8, width: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height * 3);

    for _ in 0..width * height {
        out.extend_from_slice(&[r, g, b]);
    }

    out
}

fn round_trip(rgb: &[u8], width: u32, height: u32, align: u32) -> Vec<u8> {
    let mut image = ImageBuffer::create(&HeapAlloc, ImageFormat::I420, width, height, align).unwrap();

    rgb_to_yuv420(rgb, &mut image, width, height).unwrap();

    let mut rgba = vec![0u8; (width * height * 4) as usize];
    yuv420_to_rgba(&image, &mut rgba).unwrap();

    image.release(&HeapAlloc);

    rgba
}

#[test]
fn pure_black_round_trips_exactly() {
    let rgb = constant_rgb(0, 0, 0, 16, 16);
    let rgba = round_trip(&rgb, 16, 16, 1);

    for px in rgba.chunks_exact(4) {
        assert_eq!(px, [0, 0, 0, 255]);
    }
}

#[test]
fn pure_white_round_trips_exactly() {
    let rgb = constant_rgb(255, 255, 255, 16, 16);
    let rgba = round_trip(&rgb, 16, 16, 1);

    for px in rgba.chunks_exact(4) {
        assert_eq!(px, [255, 255, 255, 255]);
    }
}

#[test]
fn constant_colors_round_trip_within_tolerance() {
    let mut rng = rand::rng();

    let mut colors = vec![
        (255, 0, 0),
        (0, 255, 0),
        (0, 0, 255),
        (255, 255, 0),
        (0, 255, 255),
        (128, 128, 128),
        (17, 93, 201),
    ];

    for _ in 0..16 {
        colors.push((
            rng.random_range(0..=255),
            rng.random_range(0..=255),
            rng.random_range(0..=255),
        ));
    }

    for (r, g, b) in colors {
        let rgb = constant_rgb(r, g, b, 16, 16);
        let rgba = round_trip(&rgb, 16, 16, 1);

        for px in rgba.chunks_exact(4) {
            assert!(
                (px[0] as i32 - r as i32).abs() <= 2
                    && (px[1] as i32 - g as i32).abs() <= 2
                    && (px[2] as i32 - b as i32).abs() <= 2,
                "({r}, {g}, {b}) came back as ({}, {}, {})",
                px[0],
                px[1],
                px[2],
            );
            assert_eq!(px[3], 255);
        }
    }
}

#[test]
fn padded_strides_convert_identically_to_tight_strides() {
    let width = 10;
    let height = 10;

    let mut rgb = Vec::with_capacity(width * height * 3);
    for i in 0..width * height {
        rgb.extend_from_slice(&[(i * 7) as u8, (i * 13) as u8, (i * 31) as u8]);
    }

    // Align 16 pads the allocation to 16x16 with stride 16; align 1 is tight
    let padded = round_trip(&rgb, width as u32, height as u32, 16);
    let tight = round_trip(&rgb, width as u32, height as u32, 1);

    assert_eq!(padded, tight);
}

#[test]
fn wrapped_planes_match_allocated_planes() {
    let width = 8u32;
    let height = 8u32;
    let rgb = constant_rgb(80, 160, 240, 8, 8);

    let mut allocated =
        ImageBuffer::create(&HeapAlloc, ImageFormat::I420, width, height, 1).unwrap();
    rgb_to_yuv420(&rgb, &mut allocated, width, height).unwrap();

    let mut y = vec![0u8; 64];
    let mut u = vec![0u8; 16];
    let mut v = vec![0u8; 16];

    let mut wrapped = ImageBuffer::wrap(
        ImageFormat::I420,
        vec![&mut y[..], &mut u[..], &mut v[..]],
        vec![8, 4, 4],
        width,
        height,
        width,
        height,
    )
    .unwrap();

    assert!(!wrapped.is_owned());
    assert!(allocated.is_owned());

    rgb_to_yuv420(&rgb, &mut wrapped, width, height).unwrap();

    let mut from_allocated = vec![0u8; 8 * 8 * 4];
    let mut from_wrapped = vec![0u8; 8 * 8 * 4];

    yuv420_to_rgba(&allocated, &mut from_allocated).unwrap();
    yuv420_to_rgba(&wrapped, &mut from_wrapped).unwrap();

    assert_eq!(from_allocated, from_wrapped);

    allocated.release(&HeapAlloc);
    drop(wrapped);

    // The wrapper never owned the memory, the caller still does
    assert_eq!(y.len(), 64);
}
