use crate::{BoundsCheckError, ImageFormat};

/// Raw result of an allocation: plane storage plus the geometry the
/// allocator actually produced, which may be padded beyond the requested
/// display dimensions.
#[derive(Debug)]
pub struct PlanarAllocation {
    pub format: ImageFormat,
    pub planes: Vec<Vec<u8>>,
    pub strides: Vec<usize>,

    /// Allocated width, >= the requested display width
    pub width: u32,
    /// Allocated height, >= the requested display height
    pub height: u32,
}

/// Everything that can go wrong when asking an allocator for a buffer
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    #[error("width or height must not be zero")]
    InvalidDimensions,

    #[error("alignment must be a power of two, got {0}")]
    BadAlign(u32),

    #[error("{0:?} cannot be allocated as an image buffer")]
    UnsupportedFormat(ImageFormat),

    #[error("allocator ran out of resources")]
    Exhausted,

    #[error("allocator returned an invalid buffer: {0}")]
    InvalidAllocation(#[from] BoundsCheckError),
}

/// Contract of the image-allocation collaborator.
///
/// Every buffer obtained through [`allocate`](ImageAlloc::allocate) must be
/// handed back to the same allocator through
/// [`release`](ImageAlloc::release) exactly once.
pub trait ImageAlloc {
    /// Allocate zero-initialized plane storage for an image with the given
    /// visible dimensions. The allocator may pad dimensions and strides up
    /// to its own alignment requirements.
    fn allocate(
        &self,
        format: ImageFormat,
        display_width: u32,
        display_height: u32,
        align: u32,
    ) -> Result<PlanarAllocation, AllocError>;

    /// Free all planes of a previous allocation
    fn release(&self, allocation: PlanarAllocation);
}

/// Plain heap allocator: dimensions and strides are rounded up to `align`
/// (a power of two), planes are zero-filled `Vec<u8>`s.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAlloc;

impl ImageAlloc for HeapAlloc {
    fn allocate(
        &self,
        format: ImageFormat,
        display_width: u32,
        display_height: u32,
        align: u32,
    ) -> Result<PlanarAllocation, AllocError> {
        if display_width == 0 || display_height == 0 {
            return Err(AllocError::InvalidDimensions);
        }

        if align == 0 || !align.is_power_of_two() {
            return Err(AllocError::BadAlign(align));
        }

        if format.plane_count() == 0 {
            return Err(AllocError::UnsupportedFormat(format));
        }

        let width = display_width.next_multiple_of(align);
        let height = display_height.next_multiple_of(align);

        let mut planes = Vec::with_capacity(format.plane_count());
        let mut strides = Vec::with_capacity(format.plane_count());

        for plane in 0..format.plane_count() {
            let stride = format
                .plane_row_bytes(plane, width)
                .next_multiple_of(align as usize);
            let rows = format.plane_rows(plane, height);

            planes.push(vec![0u8; stride * rows]);
            strides.push(stride);
        }

        Ok(PlanarAllocation {
            format,
            planes,
            strides,
            width,
            height,
        })
    }

    fn release(&self, allocation: PlanarAllocation) {
        drop(allocation);
    }
}
