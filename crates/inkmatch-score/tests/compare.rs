use approx::assert_relative_eq;
use inkmatch_core::GrayImage;
use inkmatch_score::{
    compare_signatures, CompareError, ComparisonMode, ComparisonStatus, Side, SignatureComparator,
};

const PAPER: u8 = 245;
const INK: u8 = 25;

fn stamp_disc(img: &mut GrayImage, cx: f32, cy: f32, r: f32) {
    let x0 = (cx - r).floor().max(0.0) as usize;
    let y0 = (cy - r).floor().max(0.0) as usize;
    let x1 = ((cx + r).ceil() as usize).min(img.width - 1);
    let y1 = ((cy + r).ceil() as usize).min(img.height - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                img.set(x, y, INK);
            }
        }
    }
}

/// Wavy stroke with a loop, drawn at `scale`. `flip` mirrors the wave and
/// drops the loop.
fn signature(scale: f32, flip: bool) -> GrayImage {
    let w = (300.0 * scale) as usize;
    let h = (160.0 * scale) as usize;
    let mut img = GrayImage::filled(w, h, PAPER);
    let sign = if flip { -1.0 } else { 1.0 };
    let mut t = 0.0f32;
    while t <= 220.0 {
        let x = 40.0 + t;
        let y = 75.0 + sign * 24.0 * (t / 16.0).sin();
        stamp_disc(&mut img, x * scale, y * scale, 2.2 * scale);
        t += 0.5;
    }
    if !flip {
        let mut a = 0.0f32;
        while a < std::f32::consts::TAU {
            let x = 70.0 + 10.0 * a.cos();
            let y = 88.0 + 10.0 * a.sin();
            stamp_disc(&mut img, x * scale, y * scale, 2.0 * scale);
            a += 0.05;
        }
    }
    img
}

#[test]
fn identical_inputs_score_full_marks() {
    let img = signature(1.0, false);
    let cmp = SignatureComparator::default();
    for mode in ComparisonMode::ALL {
        let result = cmp.compare(&img.view(), &img.view(), mode);
        assert!(result.is_determined());
        let m = result.metrics.expect("metrics");
        assert_relative_eq!(m.curve, 100.0, epsilon = 1e-9);
        assert_relative_eq!(m.grid, 100.0, epsilon = 1e-9);
        assert_relative_eq!(m.iou, 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.score, 100.0, epsilon = 1e-9);
    }
}

#[test]
fn score_is_symmetric_and_deterministic() {
    let a = signature(1.0, false);
    let b = signature(1.5, false);
    for mode in ComparisonMode::ALL {
        let ab = compare_signatures(&a.view(), &b.view(), mode);
        let ba = compare_signatures(&b.view(), &a.view(), mode);
        assert_relative_eq!(ab, ba, epsilon = 1e-9);
        assert_eq!(ab, compare_signatures(&a.view(), &b.view(), mode));
        assert!((0.0..=100.0).contains(&ab));
    }
}

#[test]
fn rescaled_signature_still_matches_leniently() {
    let a = signature(1.0, false);
    let b = signature(1.5, false);
    let result =
        SignatureComparator::default().compare(&a.view(), &b.view(), ComparisonMode::Lenient);
    assert!(result.is_determined());
    assert!(result.score > 60.0, "lenient score {:.1}", result.score);

    let first = result.first.as_ref().expect("first prepared");
    assert_eq!(first.normalized.canvas.width, 600);
    assert_eq!(first.normalized.canvas.height, 250);
    assert!(first.skeleton.count() < first.normalized.canvas.count());
}

#[test]
fn mirrored_stroke_scores_low_in_strict_mode() {
    let a = signature(1.0, false);
    let b = signature(1.0, true);
    let score = compare_signatures(&a.view(), &b.view(), ComparisonMode::Strict);
    assert!(score < 50.0, "strict score {score:.1}");
}

#[test]
fn blank_input_is_undetermined_not_dissimilar() {
    let blank = GrayImage::filled(300, 160, PAPER);
    let sig = signature(1.0, false);
    let result =
        SignatureComparator::default().compare(&blank.view(), &sig.view(), ComparisonMode::Lenient);

    assert_eq!(result.score, 0.0);
    assert!(result.metrics.is_none());
    assert!(result.first.is_none());
    assert!(result.second.is_some());
    match &result.status {
        ComparisonStatus::Undetermined(err) => {
            assert_eq!(err.side(), Some(Side::First));
            assert!(matches!(err, CompareError::Extraction { .. }));
        }
        other => panic!("expected undetermined, got {other:?}"),
    }
}

#[test]
fn tiny_crop_is_undetermined() {
    let tiny = GrayImage::filled(10, 10, PAPER);
    let sig = signature(1.0, false);
    let result =
        SignatureComparator::default().compare(&sig.view(), &tiny.view(), ComparisonMode::Strict);
    assert_eq!(result.score, 0.0);
    assert!(matches!(
        result.status,
        ComparisonStatus::Undetermined(CompareError::Extraction {
            side: Side::Second,
            ..
        })
    ));
}
