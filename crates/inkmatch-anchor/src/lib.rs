//! Visual anchors for relocating page regions.
//!
//! An anchor stores a distinctive patch of a reference page together with the
//! offset to a region of interest (typically a signature box). On another
//! rendering of the same document type the patch is located with a
//! coarse-to-fine ZNCC search and the region follows it. When the patch
//! cannot be found, resolution degrades to the region's position as page
//! fractions and finally to its absolute pixel position, reporting a lower
//! confidence for each tier.

mod anchor;
mod ncc;
mod search;

pub use anchor::{
    capture_anchor, resolve_anchor, AnchorError, AnchorParams, AnchorResolution,
    ResolutionSource, VisualAnchor,
};
pub use ncc::{zncc_at, PatchStats, MIN_STD};
pub use search::{find_template, MatchParams, MatchRejection, TemplateMatch};
