use criterion::{black_box, criterion_group, criterion_main, Criterion};
use inkmatch::core::GrayImage;
use inkmatch::score::{normalize, zhang_suen, NormalizeParams};
use inkmatch::stroke::StrokeExtractor;
use inkmatch::{ComparisonMode, SignatureComparator};

fn signature(scale: f32) -> GrayImage {
    let w = (300.0 * scale) as usize;
    let h = (160.0 * scale) as usize;
    let mut img = GrayImage::filled(w, h, 245);
    let r = 2.2 * scale;
    let mut t = 0.0f32;
    while t <= 220.0 {
        let cx = (40.0 + t) * scale;
        let cy = (75.0 + 24.0 * (t / 16.0).sin()) * scale;
        let x0 = (cx - r).max(0.0) as usize;
        let y0 = (cy - r).max(0.0) as usize;
        for y in y0..((cy + r) as usize + 1).min(h) {
            for x in x0..((cx + r) as usize + 1).min(w) {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if dx * dx + dy * dy <= r * r {
                    img.set(x, y, 25);
                }
            }
        }
        t += 0.5;
    }
    img
}

fn bench_pipeline(c: &mut Criterion) {
    let a = signature(1.0);
    let b = signature(1.5);
    let comparator = SignatureComparator::default();

    c.bench_function("compare_lenient_300x160_vs_450x240", |bench| {
        bench.iter(|| {
            comparator
                .compare(black_box(&a.view()), black_box(&b.view()), ComparisonMode::Lenient)
                .score
        })
    });

    let extractor = StrokeExtractor::default();
    c.bench_function("extract_stroke_300x160", |bench| {
        bench.iter(|| extractor.extract(black_box(&a.view())))
    });

    let stroke = extractor.extract(&a.view()).expect("stroke");
    let canvas = normalize(&stroke.mask, &NormalizeParams::default())
        .expect("normalized")
        .canvas;
    c.bench_function("zhang_suen_600x250", |bench| {
        bench.iter(|| zhang_suen(black_box(&canvas)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
