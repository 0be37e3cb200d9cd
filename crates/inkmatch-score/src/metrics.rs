//! Order-symmetric similarity metrics over equally sized masks.
//!
//! Every metric returns a value in `[0, 100]`.

use inkmatch_core::BinaryMask;

/// Pearson correlation with population statistics, clamped to `[0, 1]`.
///
/// If either series has zero variance the correlation is undefined; the
/// result is then 1 for identical series and 0 otherwise.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    const EPS: f64 = 1e-12;
    if var_a <= EPS || var_b <= EPS {
        return if a == b { 1.0 } else { 0.0 };
    }
    (cov / (var_a * var_b).sqrt()).clamp(0.0, 1.0)
}

/// Mean row index of the foreground in every column; empty columns map to
/// the mask height.
pub fn column_profile(mask: &BinaryMask) -> Vec<f64> {
    let (w, h) = (mask.width, mask.height);
    let mut sums = vec![0usize; w];
    let mut counts = vec![0usize; w];
    for y in 0..h {
        for x in 0..w {
            if mask.get(x, y) {
                sums[x] += y;
                counts[x] += 1;
            }
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(&s, &c)| if c == 0 { h as f64 } else { s as f64 / c as f64 })
        .collect()
}

/// Correlation of the per-column curve profiles, ×100.
pub fn curve_correlation(a: &BinaryMask, b: &BinaryMask) -> f64 {
    100.0 * pearson(&column_profile(a), &column_profile(b))
}

/// Ink fill ratio of every cell of a `cols × rows` grid, row-major.
///
/// Cell boundaries are `floor(i * extent / n)`, so cells tile the mask
/// exactly even when the extent is not divisible.
pub fn grid_densities(mask: &BinaryMask, cols: usize, rows: usize) -> Vec<f64> {
    let (w, h) = (mask.width, mask.height);
    let mut out = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        let y0 = r * h / rows;
        let y1 = (r + 1) * h / rows;
        for c in 0..cols {
            let x0 = c * w / cols;
            let x1 = (c + 1) * w / cols;
            let area = (x1 - x0) * (y1 - y0);
            if area == 0 {
                out.push(0.0);
                continue;
            }
            let mut ink = 0usize;
            for y in y0..y1 {
                for x in x0..x1 {
                    ink += usize::from(mask.get(x, y));
                }
            }
            out.push(ink as f64 / area as f64);
        }
    }
    out
}

/// Correlation of the grid fill ratios, ×100.
pub fn grid_correlation(a: &BinaryMask, b: &BinaryMask, cols: usize, rows: usize) -> f64 {
    100.0 * pearson(&grid_densities(a, cols, rows), &grid_densities(b, cols, rows))
}

/// Intersection over union, ×100. Two empty masks score 0.
pub fn iou(a: &BinaryMask, b: &BinaryMask) -> f64 {
    debug_assert!(a.same_shape(b));
    let mut inter = 0usize;
    let mut union = 0usize;
    for (&x, &y) in a.data.iter().zip(&b.data) {
        let (x, y) = (x != 0, y != 0);
        inter += usize::from(x && y);
        union += usize::from(x || y);
    }
    if union == 0 {
        return 0.0;
    }
    100.0 * inter as f64 / union as f64
}
