//! Signature similarity scoring.
//!
//! Pipeline per input: stroke extraction ([`inkmatch_stroke`]), scale to a
//! fixed canvas ([`normalize`]), Zhang-Suen thinning ([`zhang_suen`]). The
//! pair is then scored by three metrics (curve profile correlation, grid
//! density correlation, skeleton IoU) mixed according to a
//! [`ComparisonMode`].
//!
//! ```no_run
//! use inkmatch_core::GrayImageView;
//! use inkmatch_score::{ComparisonMode, SignatureComparator};
//!
//! # fn run(a: GrayImageView<'_>, b: GrayImageView<'_>) {
//! let result = SignatureComparator::default().compare(&a, &b, ComparisonMode::Strict);
//! println!("{:.1} ({:?})", result.score, result.status);
//! # }
//! ```

mod compare;
mod error;
mod metrics;
mod mode;
mod normalize;
mod skeleton;

pub use compare::{
    compare_signatures, ComparatorParams, ComparisonResult, ComparisonStatus, GridParams,
    MetricScores, PreparedSignature, SignatureComparator,
};
pub use error::{CompareError, Side};
pub use metrics::{
    column_profile, curve_correlation, grid_correlation, grid_densities, iou, pearson,
};
pub use mode::{ComparisonMode, ModeWeights, ParseModeError};
pub use normalize::{normalize, NormalizeParams, NormalizedSignature};
pub use skeleton::zhang_suen;
