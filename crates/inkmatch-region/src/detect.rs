use inkmatch_core::{to_gray, GrayImageView, PixelRect, RasterView, Reduction};
use inkmatch_stroke::StrokeExtractor;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::RegionParams;

/// Which detection tier to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStrategy {
    /// Bounding box of all dark pixels on the page.
    #[default]
    Page,
    /// Bounding box of dark pixels inside a sub-region.
    SubRegion,
    /// Bounding box of extracted ink inside a sub-region, ignoring printed
    /// rules and speckle.
    Filtered,
}

/// A detected region and whether it came from content or a fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDetection {
    pub rect: PixelRect,
    pub strategy: RegionStrategy,
    /// True when nothing was found and the tier's fallback was returned.
    pub fallback: bool,
}

impl RegionDetection {
    fn found(rect: PixelRect, strategy: RegionStrategy) -> Self {
        Self {
            rect,
            strategy,
            fallback: false,
        }
    }

    fn fallback(rect: PixelRect, strategy: RegionStrategy) -> Self {
        Self {
            rect,
            strategy,
            fallback: true,
        }
    }
}

/// Signature bounding-box detector for unmarked pages.
#[derive(Clone, Debug, Default)]
pub struct RegionDetector {
    params: RegionParams,
}

impl RegionDetector {
    pub fn new(params: RegionParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Run `strategy` on `page`.
    ///
    /// `sub_region` is ignored by [`RegionStrategy::Page`]; the other tiers
    /// default it to the lower band of the page.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, page),
            fields(w = page.width, h = page.height, ch = page.channels)
        )
    )]
    pub fn detect(
        &self,
        page: &RasterView<'_>,
        sub_region: Option<PixelRect>,
        strategy: RegionStrategy,
    ) -> RegionDetection {
        let band = || {
            sub_region.unwrap_or_else(|| self.params.sub.default_band(page.width, page.height))
        };
        match strategy {
            RegionStrategy::Page => self.scan_page(page),
            RegionStrategy::SubRegion => self.scan_sub_region(page, band()),
            RegionStrategy::Filtered => self.scan_filtered(page, band()),
        }
    }

    /// Tier 1: dark-pixel bounding box over the whole page.
    pub fn scan_page(&self, page: &RasterView<'_>) -> RegionDetection {
        let p = &self.params.page;
        let full = PixelRect::full(page.width, page.height);
        match dark_bbox(page, &full, p.dark_threshold) {
            Some(bbox) => {
                let rect = bbox.pad_clamped(
                    p.pad_for(bbox.width),
                    p.pad_for(bbox.height),
                    page.width,
                    page.height,
                );
                debug!("page scan: dark bbox {bbox:?} -> {rect:?}");
                RegionDetection::found(rect, RegionStrategy::Page)
            }
            None => {
                let rect = p.fallback.to_pixels(page.width, page.height);
                warn!("page scan found no dark pixels, using heuristic region {rect:?}");
                RegionDetection::fallback(rect, RegionStrategy::Page)
            }
        }
    }

    /// Tier 2: dark-pixel bounding box inside `region` with a fixed margin.
    ///
    /// Returns `region` unchanged when it holds no dark pixel.
    pub fn scan_sub_region(&self, page: &RasterView<'_>, region: PixelRect) -> RegionDetection {
        let p = &self.params.sub;
        let clipped = region.clamp_to(page.width, page.height);
        match dark_bbox(page, &clipped, p.dark_threshold) {
            Some(bbox) => {
                let rect = bbox.pad_clamped(p.margin, p.margin, page.width, page.height);
                debug!("sub-region scan in {clipped:?}: dark bbox {bbox:?} -> {rect:?}");
                RegionDetection::found(rect, RegionStrategy::SubRegion)
            }
            None => {
                debug!("sub-region scan found nothing in {region:?}");
                RegionDetection::fallback(region, RegionStrategy::SubRegion)
            }
        }
    }

    /// Tier 3: bounding box of extracted ink inside `region`.
    ///
    /// Returns `region` unchanged when no ink survives any contrast constant.
    pub fn scan_filtered(&self, page: &RasterView<'_>, region: PixelRect) -> RegionDetection {
        let p = &self.params.filtered;
        let clipped = region.clamp_to(page.width, page.height);
        let unchanged = RegionDetection::fallback(region, RegionStrategy::Filtered);
        if clipped.is_empty() {
            return unchanged;
        }

        let gray = to_gray(page, Reduction::Luma);
        let sub = match gray.view().crop(&clipped) {
            Ok(sub) => sub,
            Err(err) => {
                warn!("filtered scan: {err}");
                return unchanged;
            }
        };

        let extractor = StrokeExtractor::new(p.stroke.clone());
        let ink = match extractor.extract_ink_any(&sub.view()) {
            Ok(ink) => ink,
            Err(err) => {
                debug!("filtered scan found no ink in {clipped:?}: {err}");
                return unchanged;
            }
        };
        let Some(bbox) = ink.mask.bounding_box() else {
            return unchanged;
        };

        let in_page = bbox.offset(clipped.x + ink.crop.x, clipped.y + ink.crop.y);
        let pad = p.ink_pad + p.extra_pad;
        let rect = in_page.pad_clamped(pad, pad, page.width, page.height);
        debug!(
            "filtered scan at C={}: ink bbox {in_page:?} -> {rect:?}",
            ink.contrast
        );
        RegionDetection::found(rect, RegionStrategy::Filtered)
    }
}

/// Tight bounding box of pixels darker than `threshold` inside `within`.
fn dark_bbox(page: &RasterView<'_>, within: &PixelRect, threshold: f32) -> Option<PixelRect> {
    let mut x0 = usize::MAX;
    let mut y0 = usize::MAX;
    let mut x1 = 0usize;
    let mut y1 = 0usize;
    for y in within.y..within.bottom() {
        for x in within.x..within.right() {
            if page.mean_intensity(x, y) < threshold {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
        }
    }
    (x0 != usize::MAX).then(|| PixelRect::from_bounds(x0, y0, x1 + 1, y1 + 1))
}

/// Convenience wrapper over a gray view.
pub fn detect_in_gray(
    detector: &RegionDetector,
    page: &GrayImageView<'_>,
    sub_region: Option<PixelRect>,
    strategy: RegionStrategy,
) -> RegionDetection {
    detector.detect(&RasterView::from(*page), sub_region, strategy)
}
