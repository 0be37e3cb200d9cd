//! Image file decoding into the core buffer types.

use std::path::{Path, PathBuf};

use ::image::{DynamicImage, ImageReader};
use inkmatch_core::{to_gray, BinaryMask, GrayImage, GrayImageView, RasterView, Reduction};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {origin}: {source}")]
    Decode {
        /// File path, or the length of an in-memory buffer.
        origin: String,
        #[source]
        source: ::image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("image too large ({width}x{height})")]
    TooLarge { width: usize, height: usize },

    #[error(transparent)]
    Buffer(#[from] inkmatch_core::ImageError),
}

fn open(path: &Path) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::open(path)
        .map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    reader.decode().map_err(|source| DecodeError::Decode {
        origin: path.display().to_string(),
        source,
    })
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    ::image::load_from_memory(bytes).map_err(|source| DecodeError::Decode {
        origin: format!("{}-byte buffer", bytes.len()),
        source,
    })
}

/// Gray files are taken as-is; color goes through BT.601 luma.
fn into_gray(img: DynamicImage) -> Result<GrayImage, DecodeError> {
    match img {
        DynamicImage::ImageLuma8(luma) => {
            let (w, h) = (luma.width() as usize, luma.height() as usize);
            Ok(GrayImage::from_raw(w, h, luma.into_raw())?)
        }
        other => {
            let rgba = other.to_rgba8();
            Ok(to_gray(&raster_view(&rgba)?, Reduction::Luma))
        }
    }
}

/// Decode an image file into an RGBA buffer.
pub fn load_raster(path: impl AsRef<Path>) -> Result<::image::RgbaImage, DecodeError> {
    Ok(open(path.as_ref())?.to_rgba8())
}

/// Decode an in-memory encoded image (PNG, JPEG, ...) into an RGBA buffer.
pub fn decode_raster(bytes: &[u8]) -> Result<::image::RgbaImage, DecodeError> {
    Ok(decode(bytes)?.to_rgba8())
}

/// Decode an image file and reduce it to single-channel intensity.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(path)))]
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, DecodeError> {
    into_gray(open(path.as_ref())?)
}

/// [`load_gray`] for encoded bytes already in memory, e.g. an upload.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(len = bytes.len())))]
pub fn decode_gray(bytes: &[u8]) -> Result<GrayImage, DecodeError> {
    into_gray(decode(bytes)?)
}

/// Borrow an `image::RgbaImage` as a 4-channel raster.
pub fn raster_view(img: &::image::RgbaImage) -> Result<RasterView<'_>, DecodeError> {
    Ok(RasterView::new(
        img.width() as usize,
        img.height() as usize,
        4,
        img.as_raw(),
    )?)
}

/// Copy a core gray image into an `image::GrayImage`.
pub fn to_image(img: &GrayImageView<'_>) -> Result<::image::GrayImage, DecodeError> {
    let too_large = || DecodeError::TooLarge {
        width: img.width,
        height: img.height,
    };
    let w = u32::try_from(img.width).map_err(|_| too_large())?;
    let h = u32::try_from(img.height).map_err(|_| too_large())?;
    ::image::GrayImage::from_raw(w, h, img.data.to_vec()).ok_or_else(too_large)
}

/// Save a mask as black ink on white paper. The format follows the extension.
pub fn write_mask_png(mask: &BinaryMask, path: impl AsRef<Path>) -> Result<(), DecodeError> {
    let path = path.as_ref();
    let ink = mask.to_ink_image();
    to_image(&ink.view())?
        .save(path)
        .map_err(|source| DecodeError::Write {
            path: path.to_path_buf(),
            source,
        })
}
