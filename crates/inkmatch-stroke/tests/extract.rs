use inkmatch_core::GrayImage;
use inkmatch_stroke::{ExtractError, StrokeExtractor, StrokeParams};

const PAPER: u8 = 245;
const INK: u8 = 25;

fn stamp_disc(img: &mut GrayImage, cx: f32, cy: f32, r: f32, value: u8) {
    let x0 = (cx - r).floor().max(0.0) as usize;
    let y0 = (cy - r).floor().max(0.0) as usize;
    let x1 = ((cx + r).ceil() as usize).min(img.width - 1);
    let y1 = ((cy + r).ceil() as usize).min(img.height - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                img.set(x, y, value);
            }
        }
    }
}

/// A wavy pen stroke with a loop hanging off its first crest, roughly
/// 220×55 px, on a 300×160 page.
fn synthetic_signature() -> GrayImage {
    let mut img = GrayImage::filled(300, 160, PAPER);
    let mut t = 0.0f32;
    while t <= 220.0 {
        let x = 40.0 + t;
        let y = 75.0 + 24.0 * (t / 16.0).sin();
        stamp_disc(&mut img, x, y, 2.2, INK);
        t += 0.5;
    }
    let mut a = 0.0f32;
    while a < std::f32::consts::TAU {
        stamp_disc(&mut img, 70.0 + 10.0 * a.cos(), 88.0 + 10.0 * a.sin(), 2.0, INK);
        a += 0.05;
    }
    img
}

fn add_rule(img: &mut GrayImage, y: usize) {
    for x in 0..img.width {
        img.set(x, y, 60);
        img.set(x, y + 1, 60);
    }
}

#[test]
fn extracts_dominant_stroke_from_clean_crop() {
    let img = synthetic_signature();
    let stroke = StrokeExtractor::default()
        .extract(&img.view())
        .expect("signature should be found");

    assert_eq!(stroke.contrast, 15.0);
    assert_eq!(stroke.crop.width, 288);
    assert_eq!(stroke.crop.height, 148);
    assert_eq!(stroke.mask.width, stroke.crop.width);
    assert_eq!(stroke.mask.height, stroke.crop.height);

    let bbox = stroke.mask.bounding_box().expect("non-empty stroke");
    // pen path spans x ≈ 38..262 in page coordinates, shifted by the 6px crop
    assert!(bbox.x <= 34 && bbox.right() >= 254, "bbox {bbox:?}");
    assert!(stroke.mask.count() >= 500);
    assert!(stroke.blob_area > stroke.mask.count());
}

#[test]
fn printed_rule_is_removed_before_blob_selection() {
    let mut img = synthetic_signature();
    add_rule(&mut img, 130);
    let stroke = StrokeExtractor::default()
        .extract(&img.view())
        .expect("signature should be found");

    let rule_row = 130 - stroke.crop.y;
    let on_rule = (0..stroke.mask.width)
        .filter(|&x| stroke.mask.get(x, rule_row) || stroke.mask.get(x, rule_row + 1))
        .count();
    assert_eq!(on_rule, 0);
}

#[test]
fn scattered_noise_is_not_a_signature() {
    let mut img = GrayImage::filled(200, 100, PAPER);
    for i in 0..12 {
        let x = 20.0 + 14.0 * i as f32;
        let y = 25.0 + 15.0 * (i % 4) as f32;
        stamp_disc(&mut img, x, y, 1.0, INK);
    }
    let err = StrokeExtractor::default().extract(&img.view()).unwrap_err();
    assert!(matches!(err, ExtractError::NoSignature { attempts: 3, .. }));
}

#[test]
fn contrast_sweep_order_is_configurable() {
    let img = synthetic_signature();
    let params = StrokeParams {
        contrast_sweep: vec![20.0, 15.0],
        ..StrokeParams::default()
    };
    let stroke = StrokeExtractor::new(params)
        .extract(&img.view())
        .expect("signature should be found");
    assert_eq!(stroke.contrast, 20.0);
}

#[test]
fn ink_mask_keeps_every_component() {
    let mut img = synthetic_signature();
    stamp_disc(&mut img, 270.0, 140.0, 4.0, INK);
    let ex = StrokeExtractor::default();
    let ink = ex.extract_ink(&img.view(), 15.0).expect("ink");
    let stroke = ex.extract(&img.view()).expect("stroke");
    assert!(ink.mask.count() > stroke.mask.count());
    assert!(ink.mask.get(270 - ink.crop.x, 140 - ink.crop.y));
}
