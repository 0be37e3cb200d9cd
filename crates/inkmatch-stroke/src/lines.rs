//! Printed rule removal by morphological opening with line kernels.

use inkmatch_core::BinaryMask;

use crate::StrokeParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Opening (erode then dilate) with a `len`-pixel line kernel along `axis`.
///
/// Pixels outside the mask count as background, so the result is exactly
/// the set of axis-aligned foreground runs at least `len` pixels long.
pub fn open_line(mask: &BinaryMask, axis: Axis, len: usize) -> BinaryMask {
    let (w, h) = (mask.width, mask.height);
    let mut out = BinaryMask::new(w, h);
    let len = len.max(1);
    let (lines, line_len) = match axis {
        Axis::Horizontal => (h, w),
        Axis::Vertical => (w, h),
    };
    let index = |line: usize, i: usize| match axis {
        Axis::Horizontal => line * w + i,
        Axis::Vertical => i * w + line,
    };

    for line in 0..lines {
        let mut run_start = None;
        for i in 0..=line_len {
            let on = i < line_len && mask.is_on(index(line, i));
            match (on, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    if i - start >= len {
                        for j in start..i {
                            out.data[index(line, j)] = BinaryMask::ON;
                        }
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    out
}

/// Rule-removal kernel length for a crop extent.
pub fn line_kernel_len(extent: usize, params: &StrokeParams) -> usize {
    let scaled = (params.line_kernel_frac * extent as f32).floor() as usize;
    scaled.max(params.min_line_kernel)
}

/// Strip long horizontal rules, then long vertical rules, from a binary mask.
pub fn remove_lines(mask: &BinaryMask, params: &StrokeParams) -> BinaryMask {
    let kw = line_kernel_len(mask.width, params);
    let horizontal = open_line(mask, Axis::Horizontal, kw);
    let without_rows = mask.and_not(&horizontal);

    let kh = line_kernel_len(mask.height, params);
    let vertical = open_line(&without_rows, Axis::Vertical, kh);
    without_rows.and_not(&vertical)
}
