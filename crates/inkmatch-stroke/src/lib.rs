//! Ink-stroke isolation for handwritten signatures.
//!
//! Pipeline, per contrast constant:
//! - inward crop to drop border artifacts left by the caller's crop,
//! - Gaussian-weighted adaptive threshold,
//! - removal of long horizontal and vertical printed rules,
//! - pruning of tiny noise components,
//! - stroke bridging by dilation and selection of the dominant blob,
//! - sanity checks on the blob size.
//!
//! The contrast constant is swept (15, 10, 20 by default) and the first
//! accepted blob wins. Extraction failure is an expected outcome and comes
//! back as an [`ExtractError`] describing why.

mod components;
mod error;
mod extract;
mod lines;
mod params;
mod threshold;

pub use components::{label_components, remove_small_components, Blob, ComponentMap, UnionFind};
pub use error::ExtractError;
pub use extract::{InkMask, StrokeExtractor, StrokeMask};
pub use lines::{line_kernel_len, open_line, remove_lines, Axis};
pub use params::StrokeParams;
pub use threshold::{adaptive_threshold, gaussian_kernel, local_mean};
