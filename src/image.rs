use crate::{AllocError, BoundsCheckError, ImageAlloc, ImageFormat, PlanarAllocation};
use std::any::Any;
use std::sync::Arc;

/// A planar frame buffer: per-plane byte storage with explicit strides,
/// padded allocation dimensions and the visible display region.
///
/// A buffer is either *owned* (obtained through [`ImageBuffer::create`] and
/// returned to its allocator with [`ImageBuffer::release`]) or *borrowed*
/// (obtained through [`ImageBuffer::wrap`], never freeing memory it did not
/// allocate). Since `release` consumes the buffer, releasing twice or
/// touching a released buffer does not compile.
pub struct ImageBuffer<S = Vec<u8>> {
    format: ImageFormat,

    width: u32,
    height: u32,
    display_width: u32,
    display_height: u32,

    strides: Vec<usize>,
    planes: Vec<S>,

    x_chroma_shift: u32,
    y_chroma_shift: u32,

    user_data: Option<Arc<dyn Any + Send + Sync>>,

    owned: bool,
}

/// Everything that can go wrong when constructing an [`ImageBuffer`]
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("width or height must not be zero")]
    InvalidDimensions,

    #[error(
        "display region {display_width}x{display_height} exceeds the allocation {width}x{height}"
    )]
    DisplayRegionOutOfBounds {
        width: u32,
        height: u32,
        display_width: u32,
        display_height: u32,
    },

    #[error(transparent)]
    BoundsCheck(#[from] BoundsCheckError),
}

impl ImageBuffer<Vec<u8>> {
    /// Allocate a new buffer through the given allocator.
    ///
    /// Allocation failure surfaces as an [`AllocError`]; the returned buffer
    /// is always fully backed and bounds-checked. The buffer must go back to
    /// the same allocator via [`release`](ImageBuffer::release).
    pub fn create(
        alloc: &impl ImageAlloc,
        format: ImageFormat,
        display_width: u32,
        display_height: u32,
        align: u32,
    ) -> Result<Self, AllocError> {
        let allocation = alloc.allocate(format, display_width, display_height, align)?;

        // A misbehaving allocator must not hand out a usable-looking buffer
        // that is too small to index
        format.bounds_check(
            allocation
                .planes
                .iter()
                .map(|p| p.as_slice())
                .zip(allocation.strides.iter().copied()),
            allocation.width,
            allocation.height,
        )?;

        let (x_chroma_shift, y_chroma_shift) = format.chroma_shift();

        Ok(Self {
            format,
            width: allocation.width,
            height: allocation.height,
            display_width,
            display_height,
            strides: allocation.strides,
            planes: allocation.planes,
            x_chroma_shift,
            y_chroma_shift,
            user_data: None,
            owned: true,
        })
    }

    /// Hand the buffer back to the allocator that created it.
    ///
    /// For borrowed buffers this only drops the view; the underlying memory
    /// stays with whoever produced it.
    pub fn release(self, alloc: &impl ImageAlloc) {
        if !self.owned {
            return;
        }

        alloc.release(PlanarAllocation {
            format: self.format,
            planes: self.planes,
            strides: self.strides,
            width: self.width,
            height: self.height,
        });
    }
}

impl<S: AsRef<[u8]>> ImageBuffer<S> {
    /// Adopt externally produced plane memory without allocating.
    ///
    /// The wrapper never frees the underlying memory; ownership stays with
    /// the original producer. `width`/`height` describe the allocated
    /// geometry the strides belong to, `display_width`/`display_height` the
    /// visible region.
    pub fn wrap(
        format: ImageFormat,
        planes: Vec<S>,
        strides: Vec<usize>,
        width: u32,
        height: u32,
        display_width: u32,
        display_height: u32,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 || display_width == 0 || display_height == 0 {
            return Err(ImageError::InvalidDimensions);
        }

        if display_width > width || display_height > height {
            return Err(ImageError::DisplayRegionOutOfBounds {
                width,
                height,
                display_width,
                display_height,
            });
        }

        format.bounds_check(
            planes
                .iter()
                .map(|p| p.as_ref())
                .zip(strides.iter().copied()),
            width,
            height,
        )?;

        let (x_chroma_shift, y_chroma_shift) = format.chroma_shift();

        Ok(Self {
            format,
            width,
            height,
            display_width,
            display_height,
            strides,
            planes,
            x_chroma_shift,
            y_chroma_shift,
            user_data: None,
            owned: false,
        })
    }

    /// Take the plane storage back out of the buffer
    pub fn into_planes(self) -> Vec<S> {
        self.planes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Allocated width, may exceed [`display_width`](Self::display_width)
    /// due to alignment padding
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Allocated height, may exceed [`display_height`](Self::display_height)
    /// due to alignment padding
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width of the visible region; conversions iterate this, not the
    /// padded allocation width
    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    /// Height of the visible region
    pub fn display_height(&self) -> u32 {
        self.display_height
    }

    /// Byte stride of the given plane
    ///
    /// # Panics
    ///
    /// If `plane` is out of range for the format
    pub fn stride(&self, plane: usize) -> usize {
        self.strides[plane]
    }

    pub fn x_chroma_shift(&self) -> u32 {
        self.x_chroma_shift
    }

    pub fn y_chroma_shift(&self) -> u32 {
        self.y_chroma_shift
    }

    /// Storage cost of the format in bits per pixel
    pub fn bits_per_pixel(&self) -> u32 {
        self.format.bits_per_pixel()
    }

    /// Whether this buffer owns its planes and must be released through
    /// the allocator that created it
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Opaque back-reference slot for external collaborators
    pub fn user_data(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.user_data.as_ref()
    }

    pub fn set_user_data(&mut self, user_data: Option<Arc<dyn Any + Send + Sync>>) {
        self.user_data = user_data;
    }

    /// Returns an iterator yielding every plane with its associated stride
    pub fn planes(&self) -> impl Iterator<Item = (&[u8], usize)> {
        self.planes
            .iter()
            .map(|p| p.as_ref())
            .zip(self.strides.iter().copied())
    }

    pub(crate) fn plane(&self, plane: usize) -> &[u8] {
        self.planes[plane].as_ref()
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> ImageBuffer<S> {
    /// Returns an iterator yielding every plane mutably with its associated
    /// stride
    pub fn planes_mut(&mut self) -> impl Iterator<Item = (&mut [u8], usize)> {
        self.planes
            .iter_mut()
            .map(|p| p.as_mut())
            .zip(self.strides.iter().copied())
    }

    pub(crate) fn plane_mut(&mut self, plane: usize) -> &mut [u8] {
        self.planes[plane].as_mut()
    }
}

impl<S: AsRef<[u8]>> std::fmt::Debug for ImageBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("display_width", &self.display_width)
            .field("display_height", &self.display_height)
            .field("strides", &self.strides)
            .field("owned", &self.owned)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeapAlloc;

    #[test]
    fn create_reports_padded_and_display_dimensions() {
        let image = ImageBuffer::create(&HeapAlloc, ImageFormat::I420, 10, 10, 16).unwrap();

        assert_eq!(image.display_width(), 10);
        assert_eq!(image.display_height(), 10);
        assert_eq!(image.width(), 16);
        assert_eq!(image.height(), 16);
        assert_eq!(image.x_chroma_shift(), 1);
        assert_eq!(image.y_chroma_shift(), 1);
        assert_eq!(image.bits_per_pixel(), 12);
        assert!(image.is_owned());

        image.release(&HeapAlloc);
    }

    #[test]
    fn wrap_borrows_without_owning() {
        let mut y = vec![0u8; 16];
        let mut u = vec![0u8; 4];
        let mut v = vec![0u8; 4];

        let image = ImageBuffer::wrap(
            ImageFormat::I420,
            vec![&mut y[..], &mut u[..], &mut v[..]],
            vec![4, 2, 2],
            4,
            4,
            4,
            4,
        )
        .unwrap();

        assert!(!image.is_owned());
        assert_eq!(image.stride(0), 4);
        assert_eq!(image.planes().count(), 3);
    }

    #[test]
    fn wrap_rejects_undersized_planes() {
        let y = vec![0u8; 15];
        let u = vec![0u8; 4];
        let v = vec![0u8; 4];

        let err = ImageBuffer::wrap(
            ImageFormat::I420,
            vec![&y[..], &u[..], &v[..]],
            vec![4, 2, 2],
            4,
            4,
            4,
            4,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ImageError::BoundsCheck(BoundsCheckError::InvalidPlaneSize { plane: 0, .. })
        ));
    }

    #[test]
    fn wrap_rejects_oversized_display_region() {
        let y = vec![0u8; 16];
        let u = vec![0u8; 4];
        let v = vec![0u8; 4];

        let err = ImageBuffer::wrap(
            ImageFormat::I420,
            vec![&y[..], &u[..], &v[..]],
            vec![4, 2, 2],
            4,
            4,
            6,
            4,
        )
        .unwrap_err();

        assert!(matches!(err, ImageError::DisplayRegionOutOfBounds { .. }));
    }

    #[test]
    fn user_data_round_trips() {
        let mut image = ImageBuffer::create(&HeapAlloc, ImageFormat::I420, 4, 4, 1).unwrap();

        assert!(image.user_data().is_none());

        image.set_user_data(Some(Arc::new(42u32)));

        let stored = image.user_data().unwrap();
        assert_eq!(stored.downcast_ref::<u32>(), Some(&42));

        image.release(&HeapAlloc);
    }
}
