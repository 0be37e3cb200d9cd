use inkmatch_core::{FracRect, PixelRect};
use inkmatch_stroke::StrokeParams;
use serde::{Deserialize, Serialize};

/// Whole-page dark-pixel scan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageScanParams {
    /// A pixel is dark when its mean channel intensity is below this.
    pub dark_threshold: f32,
    /// Minimum padding per side, in pixels.
    pub pad_min: usize,
    /// Padding as a fraction of the box extent on the same axis.
    pub pad_frac: f64,
    /// Returned when the page has no dark pixel at all.
    pub fallback: FracRect,
}

impl Default for PageScanParams {
    fn default() -> Self {
        Self {
            dark_threshold: 160.0,
            pad_min: 10,
            pad_frac: 0.05,
            fallback: FracRect::new(0.1, 0.6, 0.8, 0.3),
        }
    }
}

impl PageScanParams {
    /// `max(pad_min, floor(pad_frac * extent))`.
    pub fn pad_for(&self, extent: usize) -> usize {
        let frac = (self.pad_frac * extent as f64).floor().max(0.0) as usize;
        self.pad_min.max(frac)
    }
}

/// Dark-pixel scan restricted to a sub-region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubScanParams {
    pub dark_threshold: f32,
    /// Fixed padding per side, in pixels.
    pub margin: usize,
    /// Top of the default search band as a fraction of the page height; the
    /// band runs to the bottom of the page over its full width.
    pub band_top: f64,
}

impl Default for SubScanParams {
    fn default() -> Self {
        Self {
            dark_threshold: 150.0,
            margin: 8,
            band_top: 0.6,
        }
    }
}

impl SubScanParams {
    pub fn default_band(&self, width: usize, height: usize) -> PixelRect {
        let top = ((self.band_top * height as f64).floor().max(0.0) as usize).min(height);
        PixelRect::from_bounds(0, top, width, height)
    }
}

/// Ink-filtered sub-region scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteredScanParams {
    /// Padding around the ink bounding box.
    pub ink_pad: usize,
    /// Extra breathing room added on top of `ink_pad`.
    pub extra_pad: usize,
    /// Extraction settings; only the ink stage runs, blob selection does not.
    pub stroke: StrokeParams,
}

impl Default for FilteredScanParams {
    fn default() -> Self {
        Self {
            ink_pad: 20,
            extra_pad: 20,
            stroke: StrokeParams::default(),
        }
    }
}

/// All region detection settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    pub page: PageScanParams,
    pub sub: SubScanParams,
    pub filtered: FilteredScanParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_padding_has_a_floor() {
        let p = PageScanParams::default();
        assert_eq!(p.pad_for(40), 10);
        assert_eq!(p.pad_for(300), 15);
        assert_eq!(p.pad_for(0), 10);
    }

    #[test]
    fn default_band_is_lower_forty_percent() {
        let band = SubScanParams::default().default_band(400, 300);
        assert_eq!(band, PixelRect::new(0, 180, 400, 120));
    }

    #[test]
    fn partial_json_overrides_nested_fields() {
        let p: RegionParams =
            serde_json::from_str(r#"{ "sub": { "margin": 3 }, "filtered": { "extra_pad": 0 } }"#)
                .expect("parse");
        assert_eq!(p.sub.margin, 3);
        assert_eq!(p.sub.dark_threshold, 150.0);
        assert_eq!(p.filtered.extra_pad, 0);
        assert_eq!(p.filtered.ink_pad, 20);
        assert_eq!(p.page, PageScanParams::default());
    }
}
