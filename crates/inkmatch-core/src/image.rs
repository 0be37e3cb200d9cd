use serde::{Deserialize, Serialize};

use crate::{ImageError, PixelRect};

/// Borrowed single-channel 8-bit raster.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap a raw buffer, checking that it holds exactly `width * height` bytes.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageError> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::full(self.width, self.height)
    }

    /// Copy out a sub-rectangle.
    pub fn crop(&self, rect: &PixelRect) -> Result<GrayImage, ImageError> {
        if !rect.fits_within(self.width, self.height) {
            return Err(ImageError::RectOutOfBounds {
                rect: *rect,
                width: self.width,
                height: self.height,
            });
        }
        let mut data = Vec::with_capacity(rect.area());
        for y in rect.y..rect.bottom() {
            data.extend_from_slice(&self.row(y)[rect.x..rect.right()]);
        }
        Ok(GrayImage {
            width: rect.width,
            height: rect.height,
            data,
        })
    }

    /// Block-average downscale: each output pixel is the rounded mean of a
    /// `factor × factor` block. Edge blocks average the pixels they cover.
    pub fn downscale_mean(&self, factor: usize) -> GrayImage {
        let factor = factor.max(1);
        let width = self.width.div_ceil(factor);
        let height = self.height.div_ceil(factor);
        let mut sums = vec![0u32; width];
        let mut data = Vec::with_capacity(width * height);
        for by in 0..height {
            sums.fill(0);
            let y0 = by * factor;
            let y1 = (y0 + factor).min(self.height);
            for y in y0..y1 {
                for (x, &v) in self.row(y).iter().enumerate() {
                    sums[x / factor] += v as u32;
                }
            }
            let rows = (y1 - y0) as u32;
            for (bx, &s) in sums.iter().enumerate() {
                let cols = (((bx + 1) * factor).min(self.width) - bx * factor) as u32;
                let n = rows * cols;
                data.push(((s + n / 2) / n) as u8);
            }
        }
        GrayImage {
            width,
            height,
            data,
        }
    }

    /// Separable `(2r + 1)²` moving average with clamped borders.
    pub fn box_blur(&self, radius: usize) -> GrayImage {
        let (w, h) = (self.width, self.height);
        if radius == 0 || w == 0 || h == 0 {
            return GrayImage {
                width: w,
                height: h,
                data: self.data.to_vec(),
            };
        }
        let r = radius as isize;
        let clamp = |v: isize, n: usize| v.clamp(0, n as isize - 1) as usize;

        let mut horiz = vec![0u32; w * h];
        for y in 0..h {
            let row = self.row(y);
            for x in 0..w {
                horiz[y * w + x] = (-r..=r)
                    .map(|d| row[clamp(x as isize + d, w)] as u32)
                    .sum();
            }
        }

        let n = ((2 * radius + 1) * (2 * radius + 1)) as u32;
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let s: u32 = (-r..=r)
                    .map(|d| horiz[clamp(y as isize + d, h) * w + x])
                    .sum();
                data.push(((s + n / 2) / n) as u8);
            }
        }
        GrayImage {
            width: w,
            height: h,
            data,
        }
    }

    /// Population mean and standard deviation of all pixels.
    pub fn mean_std(&self) -> (f64, f64) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.data.len() as f64;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for &v in self.data {
            let v = v as f64;
            sum += v;
            sum_sq += v * v;
        }
        let mean = sum / n;
        let var = (sum_sq / n - mean * mean).max(0.0);
        (mean, var.sqrt())
    }
}

/// Owned single-channel 8-bit raster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// A `width × height` image filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Take ownership of a raw buffer, checking its length.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        GrayImageView::new(width, height, &data)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }
}

/// Byte length of a `width × height × channels` buffer, rejecting empty or
/// overflowing shapes.
pub(crate) fn checked_len(
    width: usize,
    height: usize,
    channels: usize,
) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(ImageError::InvalidDimensions { width, height })
}
