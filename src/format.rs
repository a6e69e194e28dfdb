/// Pixel format tags understood by the buffer layer.
///
/// This is the closed tag set of the underlying image-allocation library.
/// The library encodes plane ordering and alpha presence as bit flags folded
/// into the tag value; here every variant is a plain enum case and the flags
/// are exposed through [`is_planar`](ImageFormat::is_planar),
/// [`swap_uv`](ImageFormat::swap_uv), [`has_alpha`](ImageFormat::has_alpha)
/// and [`ordinal`](ImageFormat::ordinal) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageFormat {
    /// No format, unusable placeholder tag
    None,

    /// Single interleaved RGB plane, 8 bits per channel
    Rgb24,

    /// Single interleaved RGBx plane, 8 bits per channel
    Rgb32,

    /// Single packed plane, 5-6-5 bits per pixel
    Rgb565,

    /// Single packed plane, 5-5-5 bits per pixel
    Rgb555,

    /// Single interleaved UYVY plane, 4:2:2 sub sampling
    Uyvy,

    /// Single interleaved YUYV plane, 4:2:2 sub sampling
    Yuy2,

    /// Single interleaved YVYU plane, 4:2:2 sub sampling
    Yvyu,

    /// Single interleaved BGR plane, 8 bits per channel
    Bgr24,

    /// Single interleaved RGBx plane, little endian
    Rgb32Le,

    /// Single interleaved ARGB plane
    Argb,

    /// Single interleaved ARGB plane, little endian
    ArgbLe,

    /// Single packed plane, 5-6-5 bits per pixel, little endian
    Rgb565Le,

    /// Single packed plane, 5-5-5 bits per pixel, little endian
    Rgb555Le,

    /// Y, V and U planes (swapped chroma order), 4:2:0 sub sampling
    Yv12,

    /// Y, U and V planes, 4:2:0 sub sampling, 8 bits per sample
    I420,

    /// Y, V and U planes in the codec's own YV12 layout
    VpxYv12,

    /// Y, U and V planes in the codec's own I420 layout
    VpxI420,

    /// Y, U and V planes, 4:2:2 sub sampling, 8 bits per sample
    I422,

    /// Y, U and V planes, 4:4:4 sub sampling, 8 bits per sample
    I444,

    /// Y, U, V and alpha planes, 4:4:4 sub sampling
    I444A,
}

impl ImageFormat {
    /// Whether samples are stored in separate per-component planes
    pub fn is_planar(self) -> bool {
        use ImageFormat::*;

        matches!(self, Yv12 | I420 | VpxYv12 | VpxI420 | I422 | I444 | I444A)
    }

    /// Whether the chroma planes are stored in V, U order instead of U, V
    pub fn swap_uv(self) -> bool {
        use ImageFormat::*;

        matches!(self, Yv12 | VpxYv12)
    }

    /// Whether the format carries an alpha channel
    pub fn has_alpha(self) -> bool {
        use ImageFormat::*;

        matches!(self, Argb | ArgbLe | I444A)
    }

    /// The allocation library's per-family ordinal for this tag
    pub fn ordinal(self) -> u8 {
        use ImageFormat::*;

        match self {
            None => 0,
            Rgb24 => 1,
            Rgb32 => 2,
            Rgb565 => 3,
            Rgb555 => 4,
            Uyvy => 5,
            Yuy2 => 6,
            Yvyu => 7,
            Bgr24 => 8,
            Rgb32Le => 9,
            Argb => 10,
            ArgbLe => 11,
            Rgb565Le => 12,
            Rgb555Le => 13,
            Yv12 => 1,
            I420 => 2,
            VpxYv12 => 3,
            VpxI420 => 4,
            I422 => 5,
            I444 => 6,
            I444A => 7,
        }
    }

    /// Number of planes the format stores samples in
    pub fn plane_count(self) -> usize {
        use ImageFormat::*;

        match self {
            None => 0,
            Yv12 | I420 | VpxYv12 | VpxI420 | I422 | I444 => 3,
            I444A => 4,
            _ => 1,
        }
    }

    /// Right-shift amounts mapping luma coordinates to chroma coordinates,
    /// as `(x_shift, y_shift)`
    pub fn chroma_shift(self) -> (u32, u32) {
        use ImageFormat::*;

        match self {
            Yv12 | I420 | VpxYv12 | VpxI420 => (1, 1),
            I422 => (1, 0),
            _ => (0, 0),
        }
    }

    /// Storage cost in bits per pixel, averaged over all planes
    pub fn bits_per_pixel(self) -> u32 {
        use ImageFormat::*;

        match self {
            None => 0,
            Yv12 | I420 | VpxYv12 | VpxI420 => 12,
            Rgb565 | Rgb555 | Uyvy | Yuy2 | Yvyu | Rgb565Le | Rgb555Le | I422 => 16,
            Rgb24 | Bgr24 | I444 => 24,
            Rgb32 | Rgb32Le | Argb | ArgbLe | I444A => 32,
        }
    }

    /// Whether the format is a valid input for the 4:2:0 conversion
    /// routines: planar, half-resolution chroma in both dimensions,
    /// non-swapped U/V order, no alpha plane
    pub fn is_yuv420(self) -> bool {
        use ImageFormat::*;

        matches!(self, I420 | VpxI420)
    }

    /// Number of sample rows held by `plane` for an image of `height` pixels
    pub(crate) fn plane_rows(self, plane: usize, height: u32) -> usize {
        let (_, y_shift) = self.chroma_shift();

        if is_chroma_plane(plane) {
            ceil_shift(height, y_shift)
        } else {
            height as usize
        }
    }

    /// Minimum bytes per row required by `plane` for an image of `width` pixels
    pub(crate) fn plane_row_bytes(self, plane: usize, width: u32) -> usize {
        if self.is_planar() {
            let (x_shift, _) = self.chroma_shift();

            if is_chroma_plane(plane) {
                ceil_shift(width, x_shift)
            } else {
                width as usize
            }
        } else {
            (width as usize) * (self.bits_per_pixel() as usize) / 8
        }
    }

    /// Check that the given planes and strides can hold an image of the
    /// given dimensions
    pub fn bounds_check<'a>(
        self,
        planes: impl Iterator<Item = (&'a [u8], usize)>,
        width: u32,
        height: u32,
    ) -> Result<(), BoundsCheckError> {
        let expected = self.plane_count();
        let mut got = 0;

        for (plane, (slice, stride)) in planes.enumerate() {
            got += 1;

            if got > expected {
                continue;
            }

            // Ensure stride is not smaller than the width would allow
            let min_stride = self.plane_row_bytes(plane, width);

            if min_stride > stride {
                return Err(BoundsCheckError::InvalidStride {
                    plane,
                    minimum: min_stride,
                    got: stride,
                });
            }

            // Ensure the plane slice covers every row
            let min_len = stride * self.plane_rows(plane, height);

            if min_len > slice.len() {
                return Err(BoundsCheckError::InvalidPlaneSize {
                    plane,
                    minimum: min_len,
                    got: slice.len(),
                });
            }
        }

        if got != expected {
            return Err(BoundsCheckError::InvalidNumberOfPlanes { expected, got });
        }

        Ok(())
    }

    pub fn variants() -> impl IntoIterator<Item = Self> {
        use ImageFormat::*;

        [
            None, Rgb24, Rgb32, Rgb565, Rgb555, Uyvy, Yuy2, Yvyu, Bgr24, Rgb32Le, Argb, ArgbLe,
            Rgb565Le, Rgb555Le, Yv12, I420, VpxYv12, VpxI420, I422, I444, I444A,
        ]
    }
}

// Planes 1 and 2 are chroma in every planar layout; plane 3 (alpha) and
// plane 0 (luma) are full resolution.
fn is_chroma_plane(plane: usize) -> bool {
    plane == 1 || plane == 2
}

fn ceil_shift(value: u32, shift: u32) -> usize {
    let value = value as usize;
    let div = 1usize << shift;

    value.div_ceil(div)
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsCheckError {
    #[error("got invalid number of planes, expected {expected} but got {got}")]
    InvalidNumberOfPlanes { expected: usize, got: usize },

    #[error("invalid stride at plane {plane}, expected it to be at least {minimum}, but got {got}")]
    InvalidStride {
        plane: usize,
        minimum: usize,
        got: usize,
    },

    #[error(
        "invalid plane size at plane {plane}, expected it to be at least {minimum}, but got {got}"
    )]
    InvalidPlaneSize {
        plane: usize,
        minimum: usize,
        got: usize,
    },
}
