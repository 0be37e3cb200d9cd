//! Fixed-canvas geometric normalization.

use inkmatch_core::{BinaryMask, PixelRect};
use serde::{Deserialize, Serialize};

/// Target canvas for normalized signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeParams {
    pub width: usize,
    pub height: usize,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            width: 600,
            height: 250,
        }
    }
}

/// A signature scaled uniformly into a fixed canvas and centered.
#[derive(Clone, Debug)]
pub struct NormalizedSignature {
    pub canvas: BinaryMask,
    /// Uniform scale applied to the source content.
    pub scale: f64,
    /// Where the resized content landed inside the canvas.
    pub content: PixelRect,
}

/// Crop to the foreground bounding box, scale by
/// `min(target_h / box_h, target_w / box_w)` with nearest-neighbor sampling,
/// and paste centered on a blank canvas.
///
/// Returns `None` for an empty mask.
pub fn normalize(mask: &BinaryMask, params: &NormalizeParams) -> Option<NormalizedSignature> {
    let (tw, th) = (params.width, params.height);
    if tw == 0 || th == 0 {
        return None;
    }
    let bbox = mask.bounding_box()?;
    let (bw, bh) = (bbox.width, bbox.height);

    let scale = (th as f64 / bh as f64).min(tw as f64 / bw as f64);
    let rw = ((bw as f64 * scale).round() as usize).clamp(1, tw);
    let rh = ((bh as f64 * scale).round() as usize).clamp(1, th);
    let ox = (tw - rw) / 2;
    let oy = (th - rh) / 2;

    let mut canvas = BinaryMask::new(tw, th);
    for dy in 0..rh {
        let sy = bbox.y + dy * bh / rh;
        for dx in 0..rw {
            let sx = bbox.x + dx * bw / rw;
            if mask.get(sx, sy) {
                canvas.set(ox + dx, oy + dy, true);
            }
        }
    }

    Some(NormalizedSignature {
        canvas,
        scale,
        content: PixelRect::new(ox, oy, rw, rh),
    })
}
