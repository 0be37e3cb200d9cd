use inkmatch_core::{FracRect, GrayImage, GrayImageView, PixelRect};
use log::{debug, warn};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{find_template, MatchParams, MatchRejection};

/// A page region remembered by the look of a nearby patch.
///
/// The mask rectangle is relocated on a new page by finding the patch and
/// applying the stored offset. Fractional rectangles back that up when the
/// patch cannot be found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualAnchor {
    pub patch: GrayImage,
    pub patch_rect: PixelRect,
    /// `mask_rect.origin - patch_rect.origin`.
    pub offset: Vector2<i32>,
    pub mask_rect: PixelRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_frac: Option<FracRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_frac: Option<FracRect>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    #[error("anchor rectangle {rect:?} is empty")]
    EmptyRect { rect: PixelRect },

    #[error("{what} rectangle {rect:?} is outside the {width}x{height} page")]
    OutsidePage {
        what: &'static str,
        rect: PixelRect,
        width: usize,
        height: usize,
    },
}

/// Which fallback tier produced a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    TemplateMatch,
    Fractional,
    Absolute,
}

/// Where an anchored mask landed on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorResolution {
    /// Mask origin; may lie off-page when the match sits near an edge.
    pub x: i32,
    pub y: i32,
    /// Template ZNCC for a match, otherwise the tier's fixed confidence.
    pub confidence: f64,
    pub source: ResolutionSource,
    /// Mask rectangle clipped to the page.
    pub rect: PixelRect,
    /// Why template matching did not produce the result, if it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

/// Resolution thresholds and fallback confidences.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorParams {
    pub matching: MatchParams,
    /// Minimum ZNCC for a template match to be trusted.
    pub accept_score: f64,
    pub fractional_confidence: f64,
    pub absolute_confidence: f64,
}

impl Default for AnchorParams {
    fn default() -> Self {
        Self {
            matching: MatchParams::default(),
            accept_score: 0.5,
            fractional_confidence: 0.6,
            absolute_confidence: 0.3,
        }
    }
}

fn check_rect(
    what: &'static str,
    rect: PixelRect,
    width: usize,
    height: usize,
) -> Result<(), AnchorError> {
    if rect.is_empty() {
        return Err(AnchorError::EmptyRect { rect });
    }
    if !rect.fits_within(width, height) {
        return Err(AnchorError::OutsidePage {
            what,
            rect,
            width,
            height,
        });
    }
    Ok(())
}

impl VisualAnchor {
    /// Record the patch under `anchor_rect` and the position of `mask_rect`
    /// relative to it.
    pub fn capture(
        page: &GrayImageView<'_>,
        anchor_rect: PixelRect,
        mask_rect: PixelRect,
    ) -> Result<Self, AnchorError> {
        let (w, h) = (page.width, page.height);
        check_rect("anchor", anchor_rect, w, h)?;
        check_rect("mask", mask_rect, w, h)?;

        let patch = page
            .crop(&anchor_rect)
            .map_err(|_| AnchorError::OutsidePage {
                what: "anchor",
                rect: anchor_rect,
                width: w,
                height: h,
            })?;
        let offset = Vector2::new(
            mask_rect.x as i32 - anchor_rect.x as i32,
            mask_rect.y as i32 - anchor_rect.y as i32,
        );
        debug!("captured anchor {anchor_rect:?} -> mask {mask_rect:?}, offset {offset:?}");

        Ok(Self {
            patch,
            patch_rect: anchor_rect,
            offset,
            mask_rect,
            patch_frac: Some(anchor_rect.to_frac(w, h)),
            mask_frac: Some(mask_rect.to_frac(w, h)),
        })
    }

    /// Locate the mask on `page`.
    ///
    /// Tries the template first; a match scoring at least `accept_score`
    /// wins. Otherwise falls back to the fractional mask rectangle, then to the
    /// stored absolute one. Never fails.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, page, params),
            fields(w = page.width, h = page.height)
        )
    )]
    pub fn resolve(&self, page: &GrayImageView<'_>, params: &AnchorParams) -> AnchorResolution {
        let (w, h) = (page.width, page.height);
        let rejection = match find_template(page, &self.patch.view(), &params.matching) {
            Ok(m) if m.score >= params.accept_score => {
                return self.from_match(m.position, m.score, w, h);
            }
            Ok(m) => MatchRejection::WeakFinalMatch {
                best: m.score,
                min: params.accept_score,
            },
            Err(r) => r,
        };
        warn!("anchor not matched: {rejection}");

        if let Some(frac) = self.mask_frac {
            let rect = frac.to_pixels(w, h);
            return AnchorResolution {
                x: rect.x as i32,
                y: rect.y as i32,
                confidence: params.fractional_confidence,
                source: ResolutionSource::Fractional,
                rect,
                rejection: Some(rejection.to_string()),
            };
        }

        let m = self.mask_rect;
        AnchorResolution {
            x: m.x as i32,
            y: m.y as i32,
            confidence: params.absolute_confidence,
            source: ResolutionSource::Absolute,
            rect: m.clamp_to(w, h),
            rejection: Some(rejection.to_string()),
        }
    }

    fn from_match(&self, at: Point2<i32>, score: f64, w: usize, h: usize) -> AnchorResolution {
        let origin = at + self.offset;
        let x0 = origin.x.max(0) as usize;
        let y0 = origin.y.max(0) as usize;
        let x1 = (origin.x + self.mask_rect.width as i32).max(0) as usize;
        let y1 = (origin.y + self.mask_rect.height as i32).max(0) as usize;
        let rect = PixelRect::from_bounds(x0, y0, x1, y1).clamp_to(w, h);
        debug!("anchor matched at {at:?} (score {score:.3}), mask at {origin:?}");
        AnchorResolution {
            x: origin.x,
            y: origin.y,
            confidence: score,
            source: ResolutionSource::TemplateMatch,
            rect,
            rejection: None,
        }
    }
}

/// Capture an anchor from `page`.
pub fn capture_anchor(
    page: &GrayImageView<'_>,
    anchor_rect: PixelRect,
    mask_rect: PixelRect,
) -> Result<VisualAnchor, AnchorError> {
    VisualAnchor::capture(page, anchor_rect, mask_rect)
}

/// Resolve an anchor with default parameters.
pub fn resolve_anchor(page: &GrayImageView<'_>, anchor: &VisualAnchor) -> AnchorResolution {
    anchor.resolve(page, &AnchorParams::default())
}
