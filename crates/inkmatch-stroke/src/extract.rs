use inkmatch_core::{BinaryMask, GrayImageView, PixelRect};
use log::debug;

use crate::components::{label_components, remove_small_components};
use crate::lines::remove_lines;
use crate::threshold::adaptive_threshold;
use crate::{ExtractError, StrokeParams};

/// Cleaned ink (threshold, rules removed, noise pruned) without blob selection.
#[derive(Clone, Debug)]
pub struct InkMask {
    pub mask: BinaryMask,
    /// Area of the source image covered by `mask` (the inward crop).
    pub crop: PixelRect,
    pub contrast: f32,
}

/// The dominant ink blob's original stroke pixels.
#[derive(Clone, Debug)]
pub struct StrokeMask {
    /// Stroke-only mask with the dimensions of `crop`.
    pub mask: BinaryMask,
    /// Area of the source image covered by `mask` (the inward crop).
    pub crop: PixelRect,
    /// Contrast constant that produced the accepted blob.
    pub contrast: f32,
    /// Area of the dominant blob after bridging dilation.
    pub blob_area: usize,
}

/// Ink-stroke extractor driven by [`StrokeParams`].
#[derive(Clone, Debug, Default)]
pub struct StrokeExtractor {
    params: StrokeParams,
}

impl StrokeExtractor {
    pub fn new(params: StrokeParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &StrokeParams {
        &self.params
    }

    /// Run the contrast sweep and return the first accepted stroke mask.
    pub fn extract(&self, image: &GrayImageView<'_>) -> Result<StrokeMask, ExtractError> {
        let mut last = ExtractError::NoInk;
        for (attempt, &c) in self.params.contrast_sweep.iter().enumerate() {
            match self.extract_with_contrast(image, c) {
                Ok(stroke) => {
                    debug!(
                        "stroke accepted at C={c} (attempt {}): blob={} px, stroke={} px",
                        attempt + 1,
                        stroke.blob_area,
                        stroke.mask.count()
                    );
                    return Ok(stroke);
                }
                Err(err @ ExtractError::RegionTooSmall { .. }) => return Err(err),
                Err(err) => {
                    debug!("stroke rejected at C={c}: {err}");
                    last = err;
                }
            }
        }
        Err(ExtractError::NoSignature {
            attempts: self.params.contrast_sweep.len(),
            last: Box::new(last),
        })
    }

    /// One extraction attempt with a fixed contrast constant.
    pub fn extract_with_contrast(
        &self,
        image: &GrayImageView<'_>,
        contrast: f32,
    ) -> Result<StrokeMask, ExtractError> {
        let ink = self.extract_ink(image, contrast)?;
        let p = &self.params;

        let bridged = ink.mask.dilate_square(p.bridge_radius);
        let map = label_components(&bridged);
        let largest = map.largest().ok_or(ExtractError::NoInk)?;
        let blob_area = map.blobs[largest].area;

        if blob_area < p.min_blob_area {
            return Err(ExtractError::BlobTooSmall {
                area: blob_area,
                min: p.min_blob_area,
            });
        }
        let total = ink.crop.area();
        let limit = (p.max_blob_fraction as f64 * total as f64).floor() as usize;
        if blob_area > limit {
            return Err(ExtractError::BackgroundCaptured {
                area: blob_area,
                limit,
                total,
            });
        }

        let stroke = map.mask_of(largest).and(&ink.mask);
        let stroke_area = stroke.count();
        if stroke_area < p.min_stroke_area {
            return Err(ExtractError::TooFewStrokePixels {
                area: stroke_area,
                min: p.min_stroke_area,
            });
        }

        Ok(StrokeMask {
            mask: stroke,
            crop: ink.crop,
            contrast,
            blob_area,
        })
    }

    /// Threshold, strip rules and prune noise, keeping every surviving
    /// component.
    pub fn extract_ink(
        &self,
        image: &GrayImageView<'_>,
        contrast: f32,
    ) -> Result<InkMask, ExtractError> {
        let p = &self.params;
        let crop = self.inward_crop(image.width, image.height)?;
        let region = image
            .crop(&crop)
            .map_err(|_| ExtractError::RegionTooSmall {
                width: image.width,
                height: image.height,
            })?;

        let raw = adaptive_threshold(&region.view(), p.block_size, contrast);
        let without_rules = remove_lines(&raw, p);
        let mask = remove_small_components(&without_rules, p.min_noise_area);
        if mask.is_empty() {
            return Err(ExtractError::NoInk);
        }
        Ok(InkMask {
            mask,
            crop,
            contrast,
        })
    }

    /// Like [`extract_ink`](Self::extract_ink), sweeping the contrast
    /// constants until some ink survives.
    pub fn extract_ink_any(&self, image: &GrayImageView<'_>) -> Result<InkMask, ExtractError> {
        let mut last = ExtractError::NoInk;
        for &c in &self.params.contrast_sweep {
            match self.extract_ink(image, c) {
                Ok(ink) => return Ok(ink),
                Err(err @ ExtractError::RegionTooSmall { .. }) => return Err(err),
                Err(err) => last = err,
            }
        }
        Err(ExtractError::NoSignature {
            attempts: self.params.contrast_sweep.len(),
            last: Box::new(last),
        })
    }

    /// The analyzed window: `crop_margin` off every side, shrunk to a quarter
    /// of the extent for tiny regions.
    fn inward_crop(&self, width: usize, height: usize) -> Result<PixelRect, ExtractError> {
        let mx = self.params.crop_margin.min(width / 4);
        let my = self.params.crop_margin.min(height / 4);
        let crop =
            PixelRect::from_bounds(mx, my, width.saturating_sub(mx), height.saturating_sub(my));
        if crop.is_empty() {
            return Err(ExtractError::RegionTooSmall { width, height });
        }
        Ok(crop)
    }
}
