use serde::{Deserialize, Serialize};

/// Tuning knobs for ink-stroke extraction.
///
/// Missing fields deserialize to their defaults, so a JSON config only needs
/// to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeParams {
    /// Pixels dropped from each side before analysis. Shrinks to a quarter of
    /// the region's width/height for tiny regions.
    pub crop_margin: usize,
    /// Adaptive threshold neighbourhood (odd). σ is `(block_size - 1) / 6`.
    pub block_size: usize,
    /// Contrast constants tried in order; the first accepted blob wins.
    pub contrast_sweep: Vec<f32>,
    /// Rule-removal kernel length as a fraction of the crop width/height.
    pub line_kernel_frac: f32,
    /// Lower bound on the rule-removal kernel length.
    pub min_line_kernel: usize,
    /// Components smaller than this (in pixels) are treated as scan noise.
    pub min_noise_area: usize,
    /// Chebyshev radius of the bridging dilation (2 => 5×5).
    pub bridge_radius: usize,
    /// Minimum area of the dominant blob after dilation.
    pub min_blob_area: usize,
    /// A dominant blob covering more than this fraction of the crop is
    /// rejected as captured background.
    pub max_blob_fraction: f32,
    /// Minimum number of original (non-dilated) stroke pixels in the blob.
    pub min_stroke_area: usize,
}

impl Default for StrokeParams {
    fn default() -> Self {
        Self {
            crop_margin: 6,
            block_size: 31,
            contrast_sweep: vec![15.0, 10.0, 20.0],
            line_kernel_frac: 0.15,
            min_line_kernel: 20,
            min_noise_area: 20,
            bridge_radius: 2,
            min_blob_area: 100,
            max_blob_fraction: 0.6,
            min_stroke_area: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let p: StrokeParams =
            serde_json::from_str(r#"{ "contrast_sweep": [12.0], "min_stroke_area": 10 }"#)
                .expect("parse params");
        assert_eq!(p.contrast_sweep, vec![12.0]);
        assert_eq!(p.min_stroke_area, 10);
        assert_eq!(p.block_size, 31);
        assert_eq!(p.crop_margin, 6);
    }
}
