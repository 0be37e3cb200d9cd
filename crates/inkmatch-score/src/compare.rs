use inkmatch_core::{BinaryMask, GrayImageView};
use inkmatch_stroke::{StrokeExtractor, StrokeMask, StrokeParams};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::metrics::{curve_correlation, grid_correlation, iou};
use crate::normalize::{normalize, NormalizeParams, NormalizedSignature};
use crate::skeleton::zhang_suen;
use crate::{CompareError, ComparisonMode, Side};

/// Configuration of the full comparison pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorParams {
    pub stroke: StrokeParams,
    pub normalize: NormalizeParams,
    pub grid: GridParams,
}

/// Grid used by the density metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub cols: usize,
    pub rows: usize,
}

impl Default for GridParams {
    fn default() -> Self {
        Self { cols: 10, rows: 4 }
    }
}

/// The three constituent metrics, each in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub curve: f64,
    pub grid: f64,
    pub iou: f64,
}

impl MetricScores {
    /// Weighted, boosted and clamped score for `mode`.
    pub fn combine(&self, mode: ComparisonMode) -> f64 {
        let w = mode.weights();
        let raw = w.curve * self.curve + w.iou * self.iou + w.grid * self.grid;
        (raw * w.boost).clamp(0.0, 100.0)
    }
}

/// One input carried through extraction, normalization and thinning.
#[derive(Clone, Debug)]
pub struct PreparedSignature {
    pub stroke: StrokeMask,
    pub normalized: NormalizedSignature,
    pub skeleton: BinaryMask,
}

/// Whether the pair could be analyzed.
#[derive(Clone, Debug, PartialEq)]
pub enum ComparisonStatus {
    Compared,
    /// At least one input yielded no usable signature; the score is 0 but
    /// does not mean the signatures differ.
    Undetermined(CompareError),
}

/// Full outcome of comparing two signature crops.
#[derive(Clone, Debug)]
pub struct ComparisonResult {
    /// Final score in `[0, 100]`; 0 when undetermined.
    pub score: f64,
    pub mode: ComparisonMode,
    pub status: ComparisonStatus,
    pub metrics: Option<MetricScores>,
    pub first: Option<PreparedSignature>,
    pub second: Option<PreparedSignature>,
}

impl ComparisonResult {
    pub fn is_determined(&self) -> bool {
        matches!(self.status, ComparisonStatus::Compared)
    }

    /// Extracted ink of both inputs (black on white), as far as it exists.
    pub fn ink_images(&self) -> [Option<inkmatch_core::GrayImage>; 2] {
        [
            self.first.as_ref().map(|p| p.stroke.mask.to_ink_image()),
            self.second.as_ref().map(|p| p.stroke.mask.to_ink_image()),
        ]
    }
}

/// Pairwise signature comparator.
#[derive(Clone, Debug, Default)]
pub struct SignatureComparator {
    params: ComparatorParams,
    extractor: StrokeExtractor,
}

impl SignatureComparator {
    pub fn new(params: ComparatorParams) -> Self {
        let extractor = StrokeExtractor::new(params.stroke.clone());
        Self { params, extractor }
    }

    #[inline]
    pub fn params(&self) -> &ComparatorParams {
        &self.params
    }

    /// Extract, normalize and thin one signature crop.
    pub fn prepare(
        &self,
        image: &GrayImageView<'_>,
        side: Side,
    ) -> Result<PreparedSignature, CompareError> {
        let stroke = self
            .extractor
            .extract(image)
            .map_err(|source| CompareError::Extraction { side, source })?;
        let normalized = normalize(&stroke.mask, &self.params.normalize)
            .ok_or(CompareError::EmptyNormalization { side })?;
        let skeleton = zhang_suen(&normalized.canvas);
        Ok(PreparedSignature {
            stroke,
            normalized,
            skeleton,
        })
    }

    /// Compute the three metrics for two prepared signatures.
    pub fn metrics(
        &self,
        a: &PreparedSignature,
        b: &PreparedSignature,
        mode: ComparisonMode,
    ) -> Result<MetricScores, CompareError> {
        let (ca, cb) = (&a.normalized.canvas, &b.normalized.canvas);
        if !ca.same_shape(cb) || !a.skeleton.same_shape(&b.skeleton) {
            return Err(CompareError::CanvasMismatch {
                a_width: ca.width,
                a_height: ca.height,
                b_width: cb.width,
                b_height: cb.height,
            });
        }

        let curve = curve_correlation(&a.skeleton, &b.skeleton);
        let grid = grid_correlation(ca, cb, self.params.grid.cols, self.params.grid.rows);
        let radius = mode.weights().iou_dilation;
        let iou = if radius == 0 {
            iou(&a.skeleton, &b.skeleton)
        } else {
            iou(&a.skeleton.dilate_square(radius), &b.skeleton.dilate_square(radius))
        };
        Ok(MetricScores { curve, grid, iou })
    }

    /// Compare two grayscale signature crops.
    ///
    /// Never fails: an input without a usable signature yields score 0 with
    /// [`ComparisonStatus::Undetermined`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, a, b),
            fields(a_w = a.width, a_h = a.height, b_w = b.width, b_h = b.height)
        )
    )]
    pub fn compare(
        &self,
        a: &GrayImageView<'_>,
        b: &GrayImageView<'_>,
        mode: ComparisonMode,
    ) -> ComparisonResult {
        let first = self.prepare(a, Side::First);
        let second = self.prepare(b, Side::Second);

        let (first, second) = match (first, second) {
            (Ok(pa), Ok(pb)) => (pa, pb),
            (Err(err), other) => return undetermined(mode, err, None, other.ok()),
            (Ok(pa), Err(err)) => return undetermined(mode, err, Some(pa), None),
        };

        match self.metrics(&first, &second, mode) {
            Ok(metrics) => {
                let score = metrics.combine(mode);
                debug!(
                    "{mode}: curve={:.2} grid={:.2} iou={:.2} => {score:.2}",
                    metrics.curve, metrics.grid, metrics.iou
                );
                ComparisonResult {
                    score,
                    mode,
                    status: ComparisonStatus::Compared,
                    metrics: Some(metrics),
                    first: Some(first),
                    second: Some(second),
                }
            }
            Err(err) => undetermined(mode, err, Some(first), Some(second)),
        }
    }
}

fn undetermined(
    mode: ComparisonMode,
    err: CompareError,
    first: Option<PreparedSignature>,
    second: Option<PreparedSignature>,
) -> ComparisonResult {
    warn!("comparison undetermined: {err}");
    ComparisonResult {
        score: 0.0,
        mode,
        status: ComparisonStatus::Undetermined(err),
        metrics: None,
        first,
        second,
    }
}

/// Score two signature crops with default parameters.
pub fn compare_signatures(
    a: &GrayImageView<'_>,
    b: &GrayImageView<'_>,
    mode: ComparisonMode,
) -> f64 {
    SignatureComparator::default().compare(a, b, mode).score
}
