//! Interleaved raster to intensity conversion.

use serde::{Deserialize, Serialize};

use crate::image::checked_len;
use crate::{GrayImage, GrayImageView, ImageError};

/// Borrowed interleaved 8-bit raster with 1 (gray), 3 (RGB) or 4 (RGBA) channels.
#[derive(Clone, Copy, Debug)]
pub struct RasterView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8],
}

impl<'a> RasterView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ImageError::UnsupportedChannels(channels));
        }
        let expected = checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Unweighted mean of the color channels at `(x, y)`. Alpha is ignored.
    #[inline]
    pub fn mean_intensity(&self, x: usize, y: usize) -> f32 {
        let px = self.pixel(x, y);
        match self.channels {
            1 => px[0] as f32,
            _ => (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0,
        }
    }

    /// ITU-R BT.601 luma at `(x, y)`.
    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        let px = self.pixel(x, y);
        match self.channels {
            1 => px[0],
            _ => {
                let v = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
                ((v + 500) / 1000) as u8
            }
        }
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let i = (y * self.width + x) * self.channels;
        &self.data[i..i + self.channels]
    }
}

impl<'a> From<GrayImageView<'a>> for RasterView<'a> {
    fn from(v: GrayImageView<'a>) -> Self {
        Self {
            width: v.width,
            height: v.height,
            channels: 1,
            data: v.data,
        }
    }
}

/// How color channels collapse into one intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Perceptual BT.601 luma.
    #[default]
    Luma,
    /// Plain mean of R, G and B.
    Mean,
}

/// Convert an interleaved raster to a single-channel intensity image.
pub fn to_gray(src: &RasterView<'_>, reduction: Reduction) -> GrayImage {
    if src.channels == 1 {
        return GrayImage {
            width: src.width,
            height: src.height,
            data: src.data.to_vec(),
        };
    }
    let mut data = Vec::with_capacity(src.width * src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let v = match reduction {
                Reduction::Luma => src.luma(x, y),
                Reduction::Mean => src.mean_intensity(x, y).round() as u8,
            };
            data.push(v);
        }
    }
    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}
