//! Core types and utilities for ink-stroke signature matching.
//!
//! This crate is intentionally small. It owns the raster and mask types that
//! every stage of the pipeline passes around, the page-rectangle geometry,
//! and the grayscale conversion from interleaved pixel buffers. It does *not*
//! decode image files; see the `inkmatch` facade crate for that.

mod error;
mod geometry;
mod grayscale;
mod image;
mod logger;
mod mask;

pub use error::ImageError;
pub use geometry::{FracRect, PixelRect};
pub use grayscale::{to_gray, RasterView, Reduction};
pub use image::{GrayImage, GrayImageView};
pub use mask::BinaryMask;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level};
