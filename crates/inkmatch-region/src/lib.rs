//! Signature region auto-detection.
//!
//! Three tiers, from coarse to selective:
//! - [`RegionStrategy::Page`]: padded bounding box of every dark pixel on the
//!   page, with a heuristic lower-page rectangle when the page is blank;
//! - [`RegionStrategy::SubRegion`]: the same inside a caller rectangle
//!   (default: the lower 40% of the page);
//! - [`RegionStrategy::Filtered`]: bounding box of the ink that survives
//!   adaptive thresholding, rule removal and noise pruning.
//!
//! Detection never fails; a tier that finds nothing returns its fallback and
//! says so in [`RegionDetection::fallback`].

mod detect;
mod params;

pub use detect::{detect_in_gray, RegionDetection, RegionDetector, RegionStrategy};
pub use params::{FilteredScanParams, PageScanParams, RegionParams, SubScanParams};
