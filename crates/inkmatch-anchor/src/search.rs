use inkmatch_core::{GrayImage, GrayImageView, PixelRect};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ncc::{zncc_at, PatchStats, MIN_STD};

/// Coarse-to-fine template search settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// The coarse pass block-averages by `max(1, floor(max(W, H) / coarse_extent))`.
    pub coarse_extent: usize,
    /// Coarse stride is the smaller downscaled patch side over this.
    pub coarse_step_div: usize,
    /// Best coarse ZNCC below this aborts the search.
    pub min_coarse_score: f64,
    /// Number of separated coarse peaks carried into refinement.
    pub coarse_candidates: usize,
    /// Lower bound on the refinement radius, in full-resolution pixels.
    pub min_refine_radius: usize,
    /// Refinement stride is the smaller patch side over this.
    pub refine_step_div: usize,
    /// Final ZNCC below this rejects the match.
    pub min_final_score: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            coarse_extent: 600,
            coarse_step_div: 4,
            min_coarse_score: 0.25,
            coarse_candidates: 8,
            min_refine_radius: 20,
            refine_step_div: 12,
            min_final_score: 0.3,
        }
    }
}

/// Best placement of a patch on a page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    /// Top-left corner of the matched window, page pixels.
    pub position: Point2<i32>,
    /// ZNCC at `position`, in `[-1, 1]`.
    pub score: f64,
}

/// Why the search produced no match.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatchRejection {
    #[error("patch is featureless (std {std:.3} < {MIN_STD})")]
    FeaturelessPatch { std: f64 },

    #[error("patch {patch_width}x{patch_height} does not fit in page {page_width}x{page_height}")]
    PatchLargerThanPage {
        patch_width: usize,
        patch_height: usize,
        page_width: usize,
        page_height: usize,
    },

    #[error("no page window has enough contrast to correlate")]
    NoValidWindow,

    #[error("best coarse score {best:.3} below {min}")]
    WeakCoarseMatch { best: f64, min: f64 },

    #[error("best final score {best:.3} below {min}")]
    WeakFinalMatch { best: f64, min: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    x: usize,
    y: usize,
    score: f64,
}

/// Keep the higher score; ties keep the earlier candidate.
fn consider(best: &mut Option<Candidate>, x: usize, y: usize, score: Option<f64>) {
    let Some(score) = score else {
        return;
    };
    if best.is_none_or(|b| score > b.score) {
        *best = Some(Candidate { x, y, score });
    }
}

/// Offsets `-k·step, …, 0, …, k·step` with `k·step <= radius`.
fn centered_offsets(radius: usize, step: usize) -> impl Iterator<Item = isize> {
    let step = step.max(1) as isize;
    let k = radius as isize / step;
    (-k..=k).map(move |i| i * step)
}

fn shifted(center: usize, delta: isize, max: usize) -> Option<usize> {
    let v = center as isize + delta;
    (v >= 0 && v as usize <= max).then_some(v as usize)
}

/// Up to `limit` best candidates, skipping any within `spacing` px on both
/// axes of one already kept. Equal scores keep scan order.
fn separated_peaks(mut scored: Vec<Candidate>, spacing: usize, limit: usize) -> Vec<Candidate> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut peaks: Vec<Candidate> = Vec::with_capacity(limit);
    for c in scored {
        if peaks.len() == limit {
            break;
        }
        let isolated = peaks
            .iter()
            .all(|p| p.x.abs_diff(c.x) > spacing || p.y.abs_diff(c.y) > spacing);
        if isolated {
            peaks.push(c);
        }
    }
    peaks
}

/// A page window and a patch interior, both box-blurred by the same radius.
///
/// The interior drops `margin` px on each side of the patch, so it never
/// reads clamped borders and an exact crop still correlates to 1. Strided
/// placements a few pixels off keep a usable score even on thin strokes.
struct Smoothed {
    page: GrayImage,
    origin: (usize, usize),
    inner: GrayImage,
    stats: PatchStats,
    margin: usize,
}

impl Smoothed {
    /// `window` must cover every placement passed to [`Smoothed::score`].
    fn new(
        page: &GrayImageView<'_>,
        window: &PixelRect,
        patch: &GrayImageView<'_>,
        radius: usize,
    ) -> Option<Self> {
        let cap = patch.width.min(patch.height).saturating_sub(1) / 2;
        // raw pixels when the blurred interior is flat
        for margin in [radius.min(cap), 0] {
            let rect = PixelRect::new(
                margin,
                margin,
                patch.width - 2 * margin,
                patch.height - 2 * margin,
            );
            let inner = patch.box_blur(margin).view().crop(&rect).ok()?;
            let stats = PatchStats::of(&inner.view());
            if stats.std >= MIN_STD {
                return Some(Self {
                    page: page.crop(window).ok()?.view().box_blur(margin),
                    origin: (window.x, window.y),
                    inner,
                    stats,
                    margin,
                });
            }
        }
        None
    }

    /// ZNCC for the patch placed with its top-left corner at `(x, y)`.
    fn score(&self, x: usize, y: usize) -> Option<f64> {
        let wx = x.checked_sub(self.origin.0)? + self.margin;
        let wy = y.checked_sub(self.origin.1)? + self.margin;
        zncc_at(&self.page.view(), &self.inner.view(), &self.stats, wx, wy)
    }
}

/// Strided grid around `(cx, cy)` scored on blurred images, then a 1px scan
/// of raw pixels around the grid best.
fn refine_and_polish(
    page: &GrayImageView<'_>,
    patch: &GrayImageView<'_>,
    stats: &PatchStats,
    (cx, cy): (usize, usize),
    radius: usize,
    step: usize,
    (max_x, max_y): (usize, usize),
) -> Option<Candidate> {
    // refine
    let window = PixelRect::from_bounds(
        cx.saturating_sub(radius),
        cy.saturating_sub(radius),
        (cx + radius).min(max_x) + patch.width,
        (cy + radius).min(max_y) + patch.height,
    )
    .intersect(&page.bounds());
    let smoothed = window.and_then(|w| Smoothed::new(page, &w, patch, step.div_ceil(2)));
    let mut refined: Option<Candidate> = None;
    if let Some(smoothed) = &smoothed {
        for dy in centered_offsets(radius, step) {
            let Some(y) = shifted(cy, dy, max_y) else {
                continue;
            };
            for dx in centered_offsets(radius, step) {
                let Some(x) = shifted(cx, dx, max_x) else {
                    continue;
                };
                consider(&mut refined, x, y, smoothed.score(x, y));
            }
        }
    }
    let (rx, ry) = refined.map_or((cx, cy), |r| (r.x, r.y));
    debug!(
        "refine around ({cx}, {cy}): radius={radius} step={step} best={:?} at ({rx}, {ry})",
        refined.map(|r| r.score)
    );

    // fine
    let mut fine: Option<Candidate> = None;
    for dy in centered_offsets(step, 1) {
        let Some(y) = shifted(ry, dy, max_y) else {
            continue;
        };
        for dx in centered_offsets(step, 1) {
            let Some(x) = shifted(rx, dx, max_x) else {
                continue;
            };
            consider(&mut fine, x, y, zncc_at(page, patch, stats, x, y));
        }
    }
    fine
}

/// Locate `patch` on `page` with a three-stage ZNCC search.
///
/// 1. coarse: both images block-averaged and box-blurred by half a stride,
///    strided scan, the best few separated peaks kept;
/// 2. refine: full resolution, strided grid centered on each peak, scored on
///    images blurred by half the refine stride;
/// 3. fine: exhaustive 1px scan of raw pixels within one refine stride.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(page, patch, params),
        fields(
            page_w = page.width,
            page_h = page.height,
            patch_w = patch.width,
            patch_h = patch.height
        )
    )
)]
pub fn find_template(
    page: &GrayImageView<'_>,
    patch: &GrayImageView<'_>,
    params: &MatchParams,
) -> Result<TemplateMatch, MatchRejection> {
    let stats = PatchStats::of(patch);
    if stats.std < MIN_STD {
        return Err(MatchRejection::FeaturelessPatch { std: stats.std });
    }
    if patch.width == 0 || patch.width > page.width || patch.height > page.height {
        return Err(MatchRejection::PatchLargerThanPage {
            patch_width: patch.width,
            patch_height: patch.height,
            page_width: page.width,
            page_height: page.height,
        });
    }

    // coarse
    let factor = (page.width.max(page.height) / params.coarse_extent.max(1)).max(1);
    let page_s = page.downscale_mean(factor);
    let patch_s = patch.downscale_mean(factor);
    let step = (patch_s.width.min(patch_s.height) / params.coarse_step_div.max(1)).max(1);
    let smoothed = Smoothed::new(
        &page_s.view(),
        &page_s.view().bounds(),
        &patch_s.view(),
        step.div_ceil(2),
    )
    .ok_or(MatchRejection::NoValidWindow)?;

    let mut scored = Vec::new();
    for y in (0..=page_s.height - patch_s.height).step_by(step) {
        for x in (0..=page_s.width - patch_s.width).step_by(step) {
            if let Some(score) = smoothed.score(x, y) {
                scored.push(Candidate { x, y, score });
            }
        }
    }
    let peaks = separated_peaks(scored, 2 * step, params.coarse_candidates.max(1));
    let best = *peaks.first().ok_or(MatchRejection::NoValidWindow)?;
    debug!(
        "coarse: factor={factor} step={step} best={:.3} at ({}, {}), {} peaks",
        best.score,
        best.x * factor,
        best.y * factor,
        peaks.len()
    );
    if best.score < params.min_coarse_score {
        return Err(MatchRejection::WeakCoarseMatch {
            best: best.score,
            min: params.min_coarse_score,
        });
    }

    let max = (page.width - patch.width, page.height - patch.height);
    let radius = (step * factor).max(params.min_refine_radius);
    let refine_step = (patch.width.min(patch.height) / params.refine_step_div.max(1)).max(1);
    let mut found: Option<Candidate> = None;
    for peak in peaks.iter().filter(|p| p.score >= params.min_coarse_score) {
        let center = ((peak.x * factor).min(max.0), (peak.y * factor).min(max.1));
        if let Some(c) = refine_and_polish(page, patch, &stats, center, radius, refine_step, max) {
            consider(&mut found, c.x, c.y, Some(c.score));
        }
    }
    let fine = found.ok_or(MatchRejection::NoValidWindow)?;
    debug!("fine: best={:.3} at ({}, {})", fine.score, fine.x, fine.y);
    if fine.score < params.min_final_score {
        return Err(MatchRejection::WeakFinalMatch {
            best: fine.score,
            min: params.min_final_score,
        });
    }

    Ok(TemplateMatch {
        position: Point2::new(fine.x as i32, fine.y as i32),
        score: fine.score,
    })
}
