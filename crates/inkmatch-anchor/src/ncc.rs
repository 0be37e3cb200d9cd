//! Zero-mean normalized cross-correlation.

use inkmatch_core::GrayImageView;

/// Windows (and patches) flatter than this carry no usable signal.
pub const MIN_STD: f64 = 1.0;

/// Precomputed statistics of a template patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchStats {
    pub n: f64,
    pub mean: f64,
    pub std: f64,
}

impl PatchStats {
    pub fn of(patch: &GrayImageView<'_>) -> Self {
        let (mean, std) = patch.mean_std();
        Self {
            n: patch.data.len() as f64,
            mean,
            std,
        }
    }
}

/// ZNCC of `patch` against the page window whose top-left corner is `(x, y)`.
///
/// `(Σ v·p − N·μv·μp) / (N·σv·σp)` with population statistics. Returns `None`
/// when the window does not fit or is flatter than [`MIN_STD`].
pub fn zncc_at(
    page: &GrayImageView<'_>,
    patch: &GrayImageView<'_>,
    stats: &PatchStats,
    x: usize,
    y: usize,
) -> Option<f64> {
    if x + patch.width > page.width || y + patch.height > page.height {
        return None;
    }
    let mut sum_v = 0u64;
    let mut sum_vv = 0u64;
    let mut sum_vp = 0u64;
    for py in 0..patch.height {
        let window = &page.row(y + py)[x..x + patch.width];
        for (&v, &p) in window.iter().zip(patch.row(py)) {
            let (v, p) = (v as u64, p as u64);
            sum_v += v;
            sum_vv += v * v;
            sum_vp += v * p;
        }
    }

    let n = stats.n;
    let mean_v = sum_v as f64 / n;
    let var_v = (sum_vv as f64 / n - mean_v * mean_v).max(0.0);
    let std_v = var_v.sqrt();
    if std_v < MIN_STD || stats.std < MIN_STD {
        return None;
    }
    Some((sum_vp as f64 - n * mean_v * stats.mean) / (n * std_v * stats.std))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use inkmatch_core::GrayImage;

    fn ramp(w: usize, h: usize) -> GrayImage {
        let data = (0..w * h)
            .map(|i| ((i % w) * 7 + (i / w) * 3) as u8)
            .collect();
        GrayImage::from_raw(w, h, data).expect("image")
    }

    #[test]
    fn exact_window_scores_one() {
        let page = ramp(20, 20);
        let patch = page.view().crop(&inkmatch_core::PixelRect::new(4, 5, 6, 6)).expect("crop");
        let stats = PatchStats::of(&patch.view());
        let s = zncc_at(&page.view(), &patch.view(), &stats, 4, 5).expect("score");
        assert_relative_eq!(s, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn inverted_patch_scores_minus_one() {
        let page = ramp(12, 12);
        let patch = page.view().crop(&inkmatch_core::PixelRect::new(2, 2, 5, 5)).expect("crop");
        let inverted = GrayImage::from_raw(5, 5, patch.data.iter().map(|&v| 255 - v).collect())
            .expect("image");
        let stats = PatchStats::of(&inverted.view());
        let s = zncc_at(&page.view(), &inverted.view(), &stats, 2, 2).expect("score");
        assert_relative_eq!(s, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_or_overhanging_windows_are_skipped() {
        let page = GrayImage::filled(10, 10, 90);
        let patch = ramp(4, 4);
        let stats = PatchStats::of(&patch.view());
        assert_eq!(zncc_at(&page.view(), &patch.view(), &stats, 0, 0), None);
        assert_eq!(zncc_at(&page.view(), &patch.view(), &stats, 7, 0), None);
    }
}
