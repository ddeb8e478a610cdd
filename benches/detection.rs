use criterion::{criterion_group, criterion_main, Criterion};
use fishmatch::{
    Detector, Frame, ImageView, MatchConfig, ResolutionProfile, Template, TemplateCollection,
};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&image[row + x0..row + x0 + width]);
    }
    out
}

/// Ring-shaped alpha mask, like an icon with transparent corners.
fn round_mask(width: usize, height: usize) -> Vec<u8> {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let r2 = cx.min(cy).powi(2);
    (0..width * height)
        .map(|i| {
            let dx = (i % width) as f64 + 0.5 - cx;
            let dy = (i / width) as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                255
            } else {
                0
            }
        })
        .collect()
}

fn bench_detection(c: &mut Criterion) {
    // Quarter-scale 1920x1080 keeps a full-frame scan tractable.
    let (width, height) = (480, 270);
    let image = make_image(width, height);
    let frame = Frame::gray(ImageView::from_slice(&image, width, height).unwrap());

    // Inside the default crop: x in [96, 240), y in [175, 269).
    let (tpl_w, tpl_h) = (24, 24);
    let icon = extract_patch(&image, width, 140, 200, tpl_w, tpl_h);
    let decoy = extract_patch(&image, width, 10, 10, tpl_w, tpl_h);
    let templates: TemplateCollection = [
        Template::with_mask("carp", icon, round_mask(tpl_w, tpl_h), tpl_w, tpl_h).unwrap(),
        Template::new("pike", decoy, tpl_w, tpl_h).unwrap(),
    ]
    .into_iter()
    .collect();

    let profile = ResolutionProfile::default();
    let detector = Detector::new(profile.clone());

    c.bench_function("detect_cropped", |b| {
        b.iter(|| black_box(detector.detect(&frame, &templates, true)));
    });
    c.bench_function("detect_full_frame", |b| {
        b.iter(|| black_box(detector.detect(&frame, &templates, false)));
    });

    if cfg!(feature = "rayon") {
        let parallel = Detector::new(profile).with_config(MatchConfig {
            parallel: true,
            ..MatchConfig::default()
        });
        c.bench_function("detect_full_frame_parallel", |b| {
            b.iter(|| black_box(parallel.detect(&frame, &templates, false)));
        });
    }
}

criterion_group!(benches, bench_detection);
criterion_main!(benches);
