//! Zhang-Suen topological thinning.

use inkmatch_core::BinaryMask;

/// Thin `mask` to curves at most one pixel wide.
///
/// Classical two-subiteration Zhang-Suen; pixels outside the mask count as
/// background. Deterministic: removals are collected over a whole
/// subiteration before being applied.
pub fn zhang_suen(mask: &BinaryMask) -> BinaryMask {
    let (w, h) = (mask.width, mask.height);
    let mut img: Vec<u8> = mask.data.iter().map(|&v| u8::from(v != 0)).collect();
    let mut doomed: Vec<usize> = Vec::new();

    loop {
        let mut removed = 0usize;
        for step in 0..2 {
            doomed.clear();
            for y in 0..h {
                for x in 0..w {
                    let i = y * w + x;
                    if img[i] == 0 {
                        continue;
                    }
                    let p = neighbors(&img, w, h, x, y);
                    if should_remove(&p, step) {
                        doomed.push(i);
                    }
                }
            }
            for &i in &doomed {
                img[i] = 0;
            }
            removed += doomed.len();
        }
        if removed == 0 {
            break;
        }
    }

    BinaryMask {
        width: w,
        height: h,
        data: img
            .into_iter()
            .map(|v| if v != 0 { BinaryMask::ON } else { BinaryMask::OFF })
            .collect(),
    }
}

/// `[P2, P3, P4, P5, P6, P7, P8, P9]`: N, NE, E, SE, S, SW, W, NW.
fn neighbors(img: &[u8], w: usize, h: usize, x: usize, y: usize) -> [u8; 8] {
    let at = |dx: isize, dy: isize| -> u8 {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
            0
        } else {
            img[ny as usize * w + nx as usize]
        }
    };
    [
        at(0, -1),
        at(1, -1),
        at(1, 0),
        at(1, 1),
        at(0, 1),
        at(-1, 1),
        at(-1, 0),
        at(-1, -1),
    ]
}

fn should_remove(p: &[u8; 8], step: usize) -> bool {
    let b: u8 = p.iter().sum();
    if !(2..=6).contains(&b) {
        return false;
    }
    let transitions = (0..8).filter(|&k| p[k] == 0 && p[(k + 1) % 8] == 1).count();
    if transitions != 1 {
        return false;
    }
    let [p2, _, p4, _, p6, _, p8, _] = *p;
    if step == 0 {
        p2 * p4 * p6 == 0 && p4 * p6 * p8 == 0
    } else {
        p2 * p4 * p8 == 0 && p2 * p6 * p8 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_run_across(mask: &BinaryMask, x: usize) -> usize {
        let mut best = 0;
        let mut run = 0;
        for y in 0..mask.height {
            if mask.get(x, y) {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    #[test]
    fn thick_bar_thins_to_a_single_line() {
        let bar = BinaryMask::from_fn(60, 20, |x, y| (5..55).contains(&x) && (6..13).contains(&y));
        let skel = zhang_suen(&bar);
        assert!(!skel.is_empty());
        assert!(skel.count() < bar.count());
        for x in 10..50 {
            assert!(max_run_across(&skel, x) <= 1, "column {x} is thicker than 1px");
        }
    }

    #[test]
    fn skeleton_never_adds_pixels() {
        let ring = BinaryMask::from_fn(40, 40, |x, y| {
            let dx = x as f32 - 20.0;
            let dy = y as f32 - 20.0;
            let r2 = dx * dx + dy * dy;
            (64.0..=196.0).contains(&r2)
        });
        let skel = zhang_suen(&ring);
        assert!(skel.count() <= ring.count());
        for (s, r) in skel.data.iter().zip(&ring.data) {
            assert!(*s == 0 || *r != 0);
        }
        // topology survives: the ring is still closed around its center
        assert!(!skel.get(20, 20));
        assert!(skel.count() > 40);
    }

    #[test]
    fn single_line_is_left_alone() {
        let line = BinaryMask::from_fn(30, 5, |x, y| y == 2 && (3..27).contains(&x));
        let skel = zhang_suen(&line);
        // end points have B = 1 and survive, so the line stays connected
        assert!(skel.get(3, 2) && skel.get(26, 2));
        assert_eq!(skel.count(), line.count());
    }

    #[test]
    fn thinning_is_deterministic() {
        let blob = BinaryMask::from_fn(25, 25, |x, y| (x * 7 + y * 3) % 11 < 8);
        assert_eq!(zhang_suen(&blob), zhang_suen(&blob));
    }
}
