//! Planar YUV 4:2:0 frame buffers for video pipelines, plus fixed-point
//! conversion between them and packed RGB/RGBA buffers.
//!
//! [`ImageBuffer`] describes a planar image (per-plane storage, strides,
//! chroma shifts, padded vs display dimensions) and tracks whether it owns
//! its memory. Allocation goes through the [`ImageAlloc`] collaborator;
//! [`HeapAlloc`] is a plain heap implementation of it.
//!
//! [`yuv420_to_rgba`] and [`rgb_to_yuv420`] are the two conversions. Both
//! validate their contract up front and then run a tight, allocation-free
//! pixel loop.

pub use alloc::{AllocError, HeapAlloc, ImageAlloc, PlanarAllocation};
pub use convert::{ConvertError, rgb_to_yuv420, yuv420_to_rgba};
pub use format::{BoundsCheckError, ImageFormat};
pub use image::{ImageBuffer, ImageError};

mod alloc;
mod convert;
mod format;
mod image;
