use std::path::Path;

use assert_cmd::Command;
use image::{GrayImage, Luma, Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::tempdir;

const PAPER: u8 = 245;
const INK: u8 = 25;

fn stamp_disc(img: &mut GrayImage, cx: f32, cy: f32, r: f32) {
    let (w, h) = img.dimensions();
    let x0 = (cx - r).floor().max(0.0) as u32;
    let y0 = (cy - r).floor().max(0.0) as u32;
    let x1 = ((cx + r).ceil() as u32).min(w - 1);
    let y1 = ((cy + r).ceil() as u32).min(h - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x, y, Luma([INK]));
            }
        }
    }
}

fn write_signature(path: &Path) {
    let mut img = GrayImage::from_pixel(300, 160, Luma([PAPER]));
    let mut t = 0.0f32;
    while t <= 220.0 {
        stamp_disc(&mut img, 40.0 + t, 75.0 + 24.0 * (t / 16.0).sin(), 2.2);
        t += 0.5;
    }
    img.save(path).expect("save signature");
}

fn inkmatch() -> Command {
    Command::cargo_bin("inkmatch").expect("binary built")
}

#[test]
fn compare_self_reports_full_score() {
    let dir = tempdir().expect("tempdir");
    let sig = dir.path().join("sig.png");
    write_signature(&sig);

    inkmatch()
        .arg("compare")
        .arg(&sig)
        .arg(&sig)
        .args(["--mode", "strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"score\": 100.0"))
        .stdout(predicate::str::contains("\"determined\": true"))
        .stdout(predicate::str::contains("\"mode\": \"strict\""));
}

#[test]
fn compare_writes_report_and_ink_masks() {
    let dir = tempdir().expect("tempdir");
    let sig = dir.path().join("sig.png");
    let blank = dir.path().join("blank.png");
    write_signature(&sig);
    GrayImage::from_pixel(300, 160, Luma([PAPER]))
        .save(&blank)
        .expect("save blank");
    let report = dir.path().join("report.json");
    let ink = dir.path().join("ink");

    inkmatch()
        .arg("compare")
        .arg(&sig)
        .arg(&blank)
        .arg("--output")
        .arg(&report)
        .arg("--ink-dir")
        .arg(&ink)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["score"], 0.0);
    assert_eq!(json["determined"], false);
    assert!(json["reason"].as_str().expect("reason").contains("second"));
    assert!(ink.join("first.png").exists());
    assert!(!ink.join("second.png").exists());
}

#[test]
fn compare_honors_crop_rectangles() {
    let dir = tempdir().expect("tempdir");
    let sig = dir.path().join("sig.png");
    write_signature(&sig);

    inkmatch()
        .arg("compare")
        .arg(&sig)
        .arg(&sig)
        .args(["--crop-second", "0,0,400,100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    inkmatch()
        .arg("compare")
        .arg(&sig)
        .arg(&sig)
        .args(["--crop-first", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("x,y,width,height"));
}

#[test]
fn detect_reports_padded_box() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.png");
    let mut img = RgbImage::from_pixel(400, 300, Rgb([250, 250, 250]));
    for y in 150..190 {
        for x in 100..200 {
            img.put_pixel(x, y, Rgb([20, 20, 80]));
        }
    }
    img.save(&page).expect("save page");

    inkmatch()
        .arg("detect")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"x\": 90"))
        .stdout(predicate::str::contains("\"width\": 120"))
        .stdout(predicate::str::contains("\"fallback\": false"));
}

#[test]
fn config_file_sets_default_mode() {
    let dir = tempdir().expect("tempdir");
    let sig = dir.path().join("sig.png");
    write_signature(&sig);
    let cfg = dir.path().join("cfg.json");
    std::fs::write(&cfg, r#"{ "mode": "super_lenient" }"#).expect("write config");

    inkmatch()
        .arg("--config")
        .arg(&cfg)
        .arg("compare")
        .arg(&sig)
        .arg(&sig)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"super_lenient\""));
}

fn write_textured_page(path: &Path) {
    let (w, h) = (600u32, 400u32);
    let mut img = GrayImage::from_pixel(w, h, Luma([128]));
    let mut acc = vec![128.0f32; (w * h) as usize];
    let mut state = 42u64;
    let mut rnd = || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as f32) / (1u64 << 31) as f32
    };
    for _ in 0..(w * h / 800) {
        let cx = rnd() * w as f32;
        let cy = rnd() * h as f32;
        let sigma = 6.0 + 10.0 * rnd();
        let amp = if rnd() < 0.5 { -70.0 } else { 70.0 };
        let r = 3.0 * sigma;
        let x0 = (cx - r).max(0.0) as u32;
        let y0 = (cy - r).max(0.0) as u32;
        let x1 = ((cx + r) as u32).min(w - 1);
        let y1 = ((cy + r) as u32).min(h - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                acc[(y * w + x) as usize] +=
                    amp * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            }
        }
    }
    for (i, v) in acc.iter().enumerate() {
        let (x, y) = (i as u32 % w, i as u32 / w);
        img.put_pixel(x, y, Luma([v.round().clamp(0.0, 255.0) as u8]));
    }
    img.save(path).expect("save page");
}

#[test]
fn anchor_capture_then_resolve() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.png");
    let anchor = dir.path().join("anchor.json");
    write_textured_page(&page);

    inkmatch()
        .args(["anchor", "capture"])
        .arg(&page)
        .args(["--anchor", "210,150,80,60", "--mask", "180,220,200,50"])
        .arg("--output")
        .arg(&anchor)
        .assert()
        .success();
    assert!(anchor.exists());

    inkmatch()
        .args(["anchor", "resolve"])
        .arg(&page)
        .arg("--anchor-file")
        .arg(&anchor)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"template_match\""))
        .stdout(predicate::str::contains("\"x\": 180"))
        .stdout(predicate::str::contains("\"y\": 220"));
}

#[test]
fn anchor_capture_rejects_rect_outside_page() {
    let dir = tempdir().expect("tempdir");
    let page = dir.path().join("page.png");
    write_textured_page(&page);

    inkmatch()
        .args(["anchor", "capture"])
        .arg(&page)
        .args(["--anchor", "580,150,80,60", "--mask", "180,220,200,50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside"));
}
