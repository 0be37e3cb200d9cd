use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page pixel coordinates.
///
/// `x..x + width` and `y..y + height` are the covered column and row ranges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelRect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from half-open bounds `[x0, x1) × [y0, y1)`.
    pub fn from_bounds(x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    /// The full extent of a `width × height` image.
    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True if the rectangle lies inside a `width × height` image.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Intersection with another rectangle, `None` if they do not overlap.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        let r = PixelRect::from_bounds(x0, y0, x1, y1);
        (!r.is_empty()).then_some(r)
    }

    /// Clip to a `width × height` image.
    pub fn clamp_to(&self, width: usize, height: usize) -> PixelRect {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        PixelRect::from_bounds(x0, y0, self.right().min(width), self.bottom().min(height))
    }

    /// Grow by `pad_x`/`pad_y` on each side, clipped to a `width × height` image.
    pub fn pad_clamped(
        &self,
        pad_x: usize,
        pad_y: usize,
        width: usize,
        height: usize,
    ) -> PixelRect {
        PixelRect::from_bounds(
            self.x.saturating_sub(pad_x),
            self.y.saturating_sub(pad_y),
            (self.right() + pad_x).min(width),
            (self.bottom() + pad_y).min(height),
        )
    }

    /// Translate by `(dx, dy)`.
    pub fn offset(&self, dx: usize, dy: usize) -> PixelRect {
        PixelRect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Express as fractions of a `width × height` page.
    pub fn to_frac(&self, width: usize, height: usize) -> FracRect {
        let w = width.max(1) as f64;
        let h = height.max(1) as f64;
        FracRect {
            x: self.x as f64 / w,
            y: self.y as f64 / h,
            width: self.width as f64 / w,
            height: self.height as f64 / h,
        }
    }
}

/// Rectangle expressed as fractions of the page width and height.
///
/// Resolution independent: the same fractional rectangle maps onto a page
/// rendered at any DPI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FracRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FracRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map onto a `width × height` page, rounding to the nearest pixel and
    /// clipping to the page.
    pub fn to_pixels(&self, width: usize, height: usize) -> PixelRect {
        let to_px = |frac: f64, extent: usize| -> usize {
            let v = (frac * extent as f64).round();
            if v.is_finite() && v > 0.0 {
                (v as usize).min(extent)
            } else {
                0
            }
        };
        let x = to_px(self.x, width);
        let y = to_px(self.y, height);
        PixelRect::new(x, y, to_px(self.width, width), to_px(self.height, height))
            .clamp_to(width, height)
    }
}
