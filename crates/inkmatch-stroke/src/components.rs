//! 4-connected component labeling over binary masks.

use inkmatch_core::{BinaryMask, PixelRect};

/// Flat array-backed union-find over linear pixel indices.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Representative of `x`'s set, compressing the path on the way.
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = x;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`; the smaller representative wins.
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let ra = self.find(a);
        let rb = self.find(b);
        let (keep, drop) = if ra <= rb { (ra, rb) } else { (rb, ra) };
        self.parent[drop as usize] = keep;
        keep
    }
}

/// One 4-connected foreground component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blob {
    pub area: usize,
    pub bbox: PixelRect,
}

/// Per-pixel component labels plus per-component statistics.
#[derive(Clone, Debug)]
pub struct ComponentMap {
    pub width: usize,
    pub height: usize,
    /// Index into `blobs` per pixel, [`ComponentMap::BACKGROUND`] for background.
    pub labels: Vec<u32>,
    /// Components in raster order of their first pixel.
    pub blobs: Vec<Blob>,
}

impl ComponentMap {
    pub const BACKGROUND: u32 = u32::MAX;

    /// Index of the component with the largest area. Ties go to the
    /// component whose first pixel comes first in raster order.
    pub fn largest(&self) -> Option<usize> {
        self.blobs
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, usize)>, (i, b)| match best {
                Some((_, area)) if area >= b.area => best,
                _ => Some((i, b.area)),
            })
            .map(|(i, _)| i)
    }

    /// Mask of a single component.
    pub fn mask_of(&self, index: usize) -> BinaryMask {
        let label = index as u32;
        BinaryMask {
            width: self.width,
            height: self.height,
            data: self
                .labels
                .iter()
                .map(|&l| {
                    if l == label {
                        BinaryMask::ON
                    } else {
                        BinaryMask::OFF
                    }
                })
                .collect(),
        }
    }
}

/// Label the 4-connected foreground components of `mask`.
pub fn label_components(mask: &BinaryMask) -> ComponentMap {
    let (w, h) = (mask.width, mask.height);
    let n = w * h;
    let mut uf = UnionFind::new(n);

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if !mask.is_on(i) {
                continue;
            }
            if x > 0 && mask.is_on(i - 1) {
                uf.union(i as u32, (i - 1) as u32);
            }
            if y > 0 && mask.is_on(i - w) {
                uf.union(i as u32, (i - w) as u32);
            }
        }
    }

    // Roots are the smallest index in their set, so the first pixel of every
    // component is its root and raster order assigns dense labels.
    let mut root_label = vec![ComponentMap::BACKGROUND; n];
    let mut labels = vec![ComponentMap::BACKGROUND; n];
    let mut bounds: Vec<(usize, usize, usize, usize, usize)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if !mask.is_on(i) {
                continue;
            }
            let root = uf.find(i as u32) as usize;
            if root_label[root] == ComponentMap::BACKGROUND {
                root_label[root] = bounds.len() as u32;
                bounds.push((0, x, y, x, y));
            }
            let label = root_label[root];
            labels[i] = label;
            let b = &mut bounds[label as usize];
            b.0 += 1;
            b.1 = b.1.min(x);
            b.2 = b.2.min(y);
            b.3 = b.3.max(x);
            b.4 = b.4.max(y);
        }
    }

    let blobs = bounds
        .into_iter()
        .map(|(area, x0, y0, x1, y1)| Blob {
            area,
            bbox: PixelRect::from_bounds(x0, y0, x1 + 1, y1 + 1),
        })
        .collect();

    ComponentMap {
        width: w,
        height: h,
        labels,
        blobs,
    }
}

/// Drop every component smaller than `min_area` pixels.
pub fn remove_small_components(mask: &BinaryMask, min_area: usize) -> BinaryMask {
    if min_area <= 1 {
        return mask.clone();
    }
    let map = label_components(mask);
    BinaryMask {
        width: mask.width,
        height: mask.height,
        data: map
            .labels
            .iter()
            .map(|&l| {
                if l != ComponentMap::BACKGROUND && map.blobs[l as usize].area >= min_area {
                    BinaryMask::ON
                } else {
                    BinaryMask::OFF
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_find_merges_and_compresses() {
        let mut uf = UnionFind::new(6);
        uf.union(4, 5);
        uf.union(5, 2);
        uf.union(0, 1);
        assert_eq!(uf.find(4), 2);
        assert_eq!(uf.find(5), 2);
        assert_ne!(uf.find(0), uf.find(2));
        uf.union(1, 4);
        assert_eq!(uf.find(5), 0);
    }

    #[test]
    fn diagonal_pixels_are_separate_components() {
        let m = BinaryMask::from_fn(3, 3, |x, y| x == y);
        let map = label_components(&m);
        assert_eq!(map.blobs.len(), 3);
        assert!(map.blobs.iter().all(|b| b.area == 1));
    }

    #[test]
    fn u_shape_merges_into_one_component() {
        // two arms joined only at the bottom: needs a union across labels
        let m = BinaryMask::from_fn(5, 5, |x, y| x == 0 || x == 4 || y == 4);
        let map = label_components(&m);
        assert_eq!(map.blobs.len(), 1);
        assert_eq!(map.blobs[0].area, 13);
        assert_eq!(map.blobs[0].bbox, PixelRect::new(0, 0, 5, 5));
    }

    #[test]
    fn largest_picks_biggest_area() {
        let m = BinaryMask::from_fn(10, 4, |x, y| (x < 2 && y < 2) || (x >= 5 && y >= 1));
        let map = label_components(&m);
        let idx = map.largest().expect("two components");
        assert_eq!(map.blobs[idx].area, 15);
        assert_eq!(map.mask_of(idx).count(), 15);
    }

    #[test]
    fn small_components_are_pruned() {
        let m = BinaryMask::from_fn(30, 10, |x, y| (x < 3 && y < 3) || (x >= 10 && y >= 5));
        let cleaned = remove_small_components(&m, 20);
        assert_eq!(cleaned.count(), 20 * 5);
        assert!(!cleaned.get(1, 1));
    }
}
