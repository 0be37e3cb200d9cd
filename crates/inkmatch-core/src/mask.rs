use serde::{Deserialize, Serialize};

use crate::{GrayImage, PixelRect};

/// Binary raster with foreground = 255 and background = 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    pub const ON: u8 = 255;
    pub const OFF: u8 = 0;

    /// An all-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![Self::OFF; width * height],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(if f(x, y) { Self::ON } else { Self::OFF });
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != Self::OFF
    }

    #[inline]
    pub fn is_on(&self, idx: usize) -> bool {
        self.data[idx] != Self::OFF
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = if on { Self::ON } else { Self::OFF };
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != Self::OFF).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == Self::OFF)
    }

    #[inline]
    pub fn same_shape(&self, other: &BinaryMask) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Tight bounding box of the foreground, `None` for an empty mask.
    pub fn bounding_box(&self) -> Option<PixelRect> {
        let mut x0 = usize::MAX;
        let mut y0 = usize::MAX;
        let mut x1 = 0usize;
        let mut y1 = 0usize;
        for y in 0..self.height {
            let row = &self.data[y * self.width..(y + 1) * self.width];
            let Some(first) = row.iter().position(|&v| v != Self::OFF) else {
                continue;
            };
            let last = row.iter().rposition(|&v| v != Self::OFF).unwrap_or(first);
            x0 = x0.min(first);
            x1 = x1.max(last);
            y0 = y0.min(y);
            y1 = y;
        }
        (x0 != usize::MAX).then(|| PixelRect::from_bounds(x0, y0, x1 + 1, y1 + 1))
    }

    /// Pixel-wise AND. Both masks must share a shape.
    pub fn and(&self, other: &BinaryMask) -> BinaryMask {
        debug_assert!(self.same_shape(other));
        self.zip_with(other, |a, b| a && b)
    }

    /// Pixel-wise `self AND NOT other`. Both masks must share a shape.
    pub fn and_not(&self, other: &BinaryMask) -> BinaryMask {
        debug_assert!(self.same_shape(other));
        self.zip_with(other, |a, b| a && !b)
    }

    fn zip_with(&self, other: &BinaryMask, f: impl Fn(bool, bool) -> bool) -> BinaryMask {
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| {
                if f(a != Self::OFF, b != Self::OFF) {
                    Self::ON
                } else {
                    Self::OFF
                }
            })
            .collect();
        BinaryMask {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Dilate with a `(2r+1) × (2r+1)` square structuring element.
    ///
    /// Separable: a horizontal then a vertical running-window pass.
    pub fn dilate_square(&self, radius: usize) -> BinaryMask {
        if radius == 0 || self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let (w, h) = (self.width, self.height);
        let mut horiz = vec![Self::OFF; w * h];
        for y in 0..h {
            let src = &self.data[y * w..(y + 1) * w];
            let dst = &mut horiz[y * w..(y + 1) * w];
            dilate_line(src.iter().copied(), dst.iter_mut(), w, radius);
        }
        let mut out = vec![Self::OFF; w * h];
        for x in 0..w {
            let src = (0..h).map(|y| horiz[y * w + x]);
            let dst = out.iter_mut().skip(x).step_by(w);
            dilate_line(src, dst, h, radius);
        }
        BinaryMask {
            width: w,
            height: h,
            data: out,
        }
    }

    /// Render as an 8-bit image with black ink on white paper.
    pub fn to_ink_image(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .map(|&v| if v != Self::OFF { 0 } else { 255 })
                .collect(),
        }
    }
}

/// 1D max filter over a line of `len` samples with window `[i - r, i + r]`.
fn dilate_line<'a>(
    src: impl Iterator<Item = u8>,
    dst: impl Iterator<Item = &'a mut u8>,
    len: usize,
    radius: usize,
) {
    let mut prefix = Vec::with_capacity(len + 1);
    prefix.push(0u32);
    let mut acc = 0u32;
    for v in src {
        acc += u32::from(v != BinaryMask::OFF);
        prefix.push(acc);
    }
    for (i, d) in dst.enumerate() {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius + 1).min(len);
        *d = if prefix[hi] > prefix[lo] {
            BinaryMask::ON
        } else {
            BinaryMask::OFF
        };
    }
}
