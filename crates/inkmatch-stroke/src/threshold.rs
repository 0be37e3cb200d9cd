//! Gaussian-weighted adaptive thresholding.

use inkmatch_core::{BinaryMask, GrayImageView};

/// Normalized 1D Gaussian weights for a `block_size` window.
///
/// Even sizes are bumped to the next odd size. σ follows the usual
/// `(block_size - 1) / 6` rule so that the window spans ±3σ.
pub fn gaussian_kernel(block_size: usize) -> Vec<f32> {
    let size = block_size.max(1) | 1;
    let radius = (size / 2) as i32;
    let sigma = (size as f32 - 1.0) / 6.0;
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = k.iter().sum();
    for w in &mut k {
        *w /= sum;
    }
    k
}

/// Gaussian-weighted local mean of every pixel, edge-clamped.
///
/// Separable: a horizontal then a vertical pass over an `f32` buffer.
pub fn local_mean(src: &GrayImageView<'_>, block_size: usize) -> Vec<f32> {
    let (w, h) = (src.width, src.height);
    let kernel = gaussian_kernel(block_size);
    let radius = (kernel.len() / 2) as isize;

    let mut horiz = vec![0.0f32; w * h];
    for y in 0..h {
        let row = src.row(y);
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &wk) in kernel.iter().enumerate() {
                let sx = clamp_index(x as isize + k as isize - radius, w);
                acc += wk * row[sx] as f32;
            }
            horiz[y * w + x] = acc;
        }
    }

    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &wk) in kernel.iter().enumerate() {
                let sy = clamp_index(y as isize + k as isize - radius, h);
                acc += wk * horiz[sy * w + x];
            }
            out[y * w + x] = acc;
        }
    }
    out
}

/// Foreground where `intensity < local_mean - c`.
///
/// Dark ink on light paper becomes foreground (255).
pub fn adaptive_threshold(src: &GrayImageView<'_>, block_size: usize, c: f32) -> BinaryMask {
    let mean = local_mean(src, block_size);
    let data = src
        .data
        .iter()
        .zip(&mean)
        .map(|(&v, &m)| {
            if (v as f32) < m - c {
                BinaryMask::ON
            } else {
                BinaryMask::OFF
            }
        })
        .collect();
    BinaryMask {
        width: src.width,
        height: src.height,
        data,
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
