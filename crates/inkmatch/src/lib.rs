//! High-level facade for the `inkmatch-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates under short module names,
//! - one-call entry points for the three capabilities (signature comparison,
//!   region detection, visual anchors),
//! - JSON configuration and report types ([`config`]),
//! - (feature `image`) file decoding into the core buffer types ([`io`]),
//! - (feature `cli`) the `inkmatch` command-line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use inkmatch::{compare_signatures, io, ComparisonMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a = io::load_gray("reference.png")?;
//! let b = io::load_gray("candidate.png")?;
//! let score = compare_signatures(&a.view(), &b.view(), ComparisonMode::Lenient);
//! println!("similarity: {score:.1}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `inkmatch::core`: rasters, masks, rectangles, grayscale conversion, logger.
//! - `inkmatch::stroke`: adaptive threshold, rule removal, blob extraction.
//! - `inkmatch::score`: normalization, thinning, metrics, comparison modes.
//! - `inkmatch::region`: signature bounding-box detection.
//! - `inkmatch::anchor`: template search and visual anchors.

pub use inkmatch_anchor as anchor;
pub use inkmatch_core as core;
pub use inkmatch_region as region;
pub use inkmatch_score as score;
pub use inkmatch_stroke as stroke;

pub mod config;
#[cfg(feature = "image")]
pub mod io;

pub use inkmatch_anchor::{
    capture_anchor, resolve_anchor, AnchorError, AnchorParams, AnchorResolution,
    ResolutionSource, VisualAnchor,
};
pub use inkmatch_core::{
    BinaryMask, FracRect, GrayImage, GrayImageView, ImageError, PixelRect, RasterView,
};
pub use inkmatch_region::{RegionDetection, RegionDetector, RegionParams, RegionStrategy};
pub use inkmatch_score::{
    compare_signatures, ComparatorParams, ComparisonMode, ComparisonResult, ComparisonStatus,
    MetricScores, SignatureComparator,
};
pub use inkmatch_stroke::{ExtractError, StrokeParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Detect a signature bounding box on `page` with default parameters.
///
/// `sub_region` is only consulted by the sub-region tiers, which default it to
/// the lower 40% of the page.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(page), fields(width = page.width, height = page.height))
)]
pub fn detect_region(
    page: &RasterView<'_>,
    sub_region: Option<PixelRect>,
    strategy: RegionStrategy,
) -> PixelRect {
    RegionDetector::default()
        .detect(page, sub_region, strategy)
        .rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_region_falls_back_on_blank_gray_page() {
        let page = GrayImage::filled(200, 100, 250);
        let rect = detect_region(&RasterView::from(page.view()), None, RegionStrategy::Page);
        assert_eq!(rect, PixelRect::new(20, 60, 160, 30));
    }
}
