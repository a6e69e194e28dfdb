use crate::{ImageBuffer, ImageFormat};

/// Everything that can go wrong before a conversion starts.
///
/// All checks run once at function entry; given valid inputs the pixel
/// loops themselves cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported pixel format {0:?}, expected a non-swapped planar 4:2:0 format")]
    UnsupportedFormat(ImageFormat),

    #[error("width and height must be even for 4:2:0 subsampling, got {width}x{height}")]
    OddDimensions { width: u32, height: u32 },

    #[error("source buffer too small, expected at least {expected} bytes but got {got}")]
    SourceTooSmall { expected: usize, got: usize },

    #[error("destination buffer too small, expected at least {expected} bytes but got {got}")]
    DestinationTooSmall { expected: usize, got: usize },

    #[error(
        "conversion region {width}x{height} exceeds the display region {display_width}x{display_height}"
    )]
    RegionOutOfBounds {
        width: u32,
        height: u32,
        display_width: u32,
        display_height: u32,
    },

    #[error("got invalid number of planes, expected {expected} but got {got}")]
    InvalidNumberOfPlanes { expected: usize, got: usize },
}

/// Convert a planar 4:2:0 image into a packed RGBA buffer.
///
/// Iterates the source's display region; `dst` must hold at least
/// `4 * display_width * display_height` bytes and receives `R,G,B,255`
/// per pixel in row-major order with no padding.
///
/// Chroma is sampled at half resolution with truncating division (nearest
/// sample, no interpolation), then pushed through the fixed-point BT.601
/// transform with saturation into `[0, 255]`.
pub fn yuv420_to_rgba<S: AsRef<[u8]>>(
    src: &ImageBuffer<S>,
    dst: &mut [u8],
) -> Result<(), ConvertError> {
    if !src.format().is_yuv420() {
        return Err(ConvertError::UnsupportedFormat(src.format()));
    }

    let dw = src.display_width() as usize;
    let dh = src.display_height() as usize;

    let expected = dw * dh * 4;

    if dst.len() < expected {
        return Err(ConvertError::DestinationTooSmall {
            expected,
            got: dst.len(),
        });
    }

    let y_plane = src.plane(0);
    let u_plane = src.plane(1);
    let v_plane = src.plane(2);

    let y_stride = src.stride(0);
    let u_stride = src.stride(1);
    let v_stride = src.stride(2);

    for (i, dst_row) in dst[..expected].chunks_exact_mut(dw * 4).enumerate() {
        let y_row = &y_plane[i * y_stride..];
        let u_row = &u_plane[(i / 2) * u_stride..];
        let v_row = &v_plane[(i / 2) * v_stride..];

        for (j, px) in dst_row.chunks_exact_mut(4).enumerate() {
            let y = y_row[j] as i32;
            let u = u_row[j / 2] as i32;
            let v = v_row[j / 2] as i32;

            let c = 298 * (y - 16);

            let r = (c + 409 * (v - 128) + 128) >> 8;
            let g = (c - 100 * (u - 128) - 208 * (v - 128) + 128) >> 8;
            let b = (c + 516 * (u - 128) + 128) >> 8;

            px[0] = saturate(r);
            px[1] = saturate(g);
            px[2] = saturate(b);
            px[3] = 255;
        }
    }

    Ok(())
}

/// Convert a packed RGB buffer into the planar 4:2:0 image.
///
/// `src` must hold `width * height * 3` bytes of row-major `R,G,B`
/// triplets with no padding; `width` and `height` must be even and fit
/// within the destination's display region.
///
/// Luma is written for every pixel. One chroma sample is produced per 2x2
/// pixel block by averaging the four source triplets with rounding before
/// applying the fixed-point transform. The exact averaging arithmetic is
/// part of this function's contract; downstream consumers depend on its
/// visual characteristic.
pub fn rgb_to_yuv420<S: AsRef<[u8]> + AsMut<[u8]>>(
    src: &[u8],
    dst: &mut ImageBuffer<S>,
    width: u32,
    height: u32,
) -> Result<(), ConvertError> {
    if !dst.format().is_yuv420() {
        return Err(ConvertError::UnsupportedFormat(dst.format()));
    }

    if width % 2 != 0 || height % 2 != 0 {
        return Err(ConvertError::OddDimensions { width, height });
    }

    if width > dst.display_width() || height > dst.display_height() {
        return Err(ConvertError::RegionOutOfBounds {
            width,
            height,
            display_width: dst.display_width(),
            display_height: dst.display_height(),
        });
    }

    let w = width as usize;
    let h = height as usize;

    let expected = w * h * 3;

    if src.len() < expected {
        return Err(ConvertError::SourceTooSmall {
            expected,
            got: src.len(),
        });
    }

    let [(y_plane, y_stride), (u_plane, u_stride), (v_plane, v_stride)] =
        read_planes_mut(dst.planes_mut())?;

    for y in (0..h).step_by(2) {
        let top = &src[y * w * 3..(y + 1) * w * 3];
        let bot = &src[(y + 1) * w * 3..(y + 2) * w * 3];

        for (x, px) in top.chunks_exact(3).enumerate() {
            y_plane[y * y_stride + x] = luma(px);
        }

        for (x, px) in bot.chunks_exact(3).enumerate() {
            y_plane[(y + 1) * y_stride + x] = luma(px);
        }

        let cy = y / 2;

        for cx in 0..w / 2 {
            let x = cx * 6;

            let a = &top[x..x + 3];
            let b = &top[x + 3..x + 6];
            let c = &bot[x..x + 3];
            let d = &bot[x + 3..x + 6];

            // One chroma sample per 2x2 block: average the four source
            // triplets with rounding, then transform the averaged color
            let r = (a[0] as i32 + b[0] as i32 + c[0] as i32 + d[0] as i32 + 2) / 4;
            let g = (a[1] as i32 + b[1] as i32 + c[1] as i32 + d[1] as i32 + 2) / 4;
            let bl = (a[2] as i32 + b[2] as i32 + c[2] as i32 + d[2] as i32 + 2) / 4;

            u_plane[cy * u_stride + cx] = (((-38 * r - 74 * g + 112 * bl) >> 8) + 128) as u8;
            v_plane[cy * v_stride + cx] = (((112 * r - 94 * g - 18 * bl) >> 8) + 128) as u8;
        }
    }

    Ok(())
}

fn luma(px: &[u8]) -> u8 {
    (((66 * px[0] as i32 + 129 * px[1] as i32 + 25 * px[2] as i32) >> 8) + 16) as u8
}

fn saturate(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

fn read_planes_mut<'a, const N: usize>(
    mut iter: impl Iterator<Item = (&'a mut [u8], usize)>,
) -> Result<[(&'a mut [u8], usize); N], ConvertError> {
    use std::mem::MaybeUninit;

    let mut out: [MaybeUninit<(&'a mut [u8], usize)>; N] = [const { MaybeUninit::uninit() }; N];

    for (i, out) in out.iter_mut().enumerate() {
        out.write(iter.next().ok_or(ConvertError::InvalidNumberOfPlanes {
            expected: N,
            got: i,
        })?);
    }

    Ok(out.map(|plane| unsafe { plane.assume_init() }))
}
