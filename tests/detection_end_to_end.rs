use fishmatch::{
    detect, load_frame, Detector, Frame, ImageView, MatchConfig, PixelRect, RegionSpec,
    ResolutionProfile, Template, TemplateCollection,
};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

// 200x120 frame: the default crop is x in [40, 100), y in [78, 120).
const WIDTH: usize = 200;
const HEIGHT: usize = 120;
const TPL_W: usize = 12;
const TPL_H: usize = 10;

fn noise(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.random()).collect()
}

fn paste(frame: &mut [u8], tpl: &[u8], x0: usize, y0: usize) {
    for y in 0..TPL_H {
        let dst = (y0 + y) * WIDTH + x0;
        frame[dst..dst + TPL_W].copy_from_slice(&tpl[y * TPL_W..(y + 1) * TPL_W]);
    }
}

fn fish_templates(rng: &mut StdRng) -> (TemplateCollection, Vec<u8>) {
    let salmon = noise(rng, TPL_W * TPL_H);
    let templates = [
        Template::new("salmon", salmon.clone(), TPL_W, TPL_H).unwrap(),
        Template::new("trout", noise(rng, TPL_W * TPL_H), TPL_W, TPL_H).unwrap(),
        Template::new("perch", noise(rng, TPL_W * TPL_H), TPL_W, TPL_H).unwrap(),
    ]
    .into_iter()
    .collect();
    (templates, salmon)
}

#[test]
fn icon_inside_crop_is_found_with_reduction() {
    let mut rng = StdRng::seed_from_u64(1);
    let (templates, salmon) = fish_templates(&mut rng);
    let mut image = noise(&mut rng, WIDTH * HEIGHT);
    paste(&mut image, &salmon, 60, 95);
    let frame = Frame::gray(ImageView::from_slice(&image, WIDTH, HEIGHT).unwrap());

    let outcome = detect(&frame, &templates, &ResolutionProfile::default(), true);
    assert_eq!(outcome.label.as_deref(), Some("salmon"));
    assert!(outcome.score > 0.95, "score {}", outcome.score);
    assert_eq!(outcome.location, Some((60, 95)));
    assert_eq!(
        outcome.region,
        Some(PixelRect {
            x: 40,
            y: 78,
            width: 60,
            height: 42,
        })
    );
    assert!(outcome.elapsed_ms >= 0.0);
}

#[test]
fn icon_outside_crop_needs_full_frame() {
    let mut rng = StdRng::seed_from_u64(2);
    let (templates, salmon) = fish_templates(&mut rng);
    let mut image = noise(&mut rng, WIDTH * HEIGHT);
    paste(&mut image, &salmon, 150, 20);
    let frame = Frame::gray(ImageView::from_slice(&image, WIDTH, HEIGHT).unwrap());
    let detector = Detector::new(ResolutionProfile::default());

    let cropped = detector.detect(&frame, &templates, true);
    // Whatever wins inside the crop is a chance correlation with noise.
    assert!(cropped.score < 0.8, "{cropped:?}");

    let full = detector.detect(&frame, &templates, false);
    assert_eq!(full.label.as_deref(), Some("salmon"));
    assert!(full.score > 0.95);
    assert_eq!(full.location, Some((150, 20)));
    assert!(full.region.is_none());
}

#[test]
fn detection_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(3);
    let (templates, salmon) = fish_templates(&mut rng);
    let mut image = noise(&mut rng, WIDTH * HEIGHT);
    paste(&mut image, &salmon, 45, 100);
    let frame = Frame::gray(ImageView::from_slice(&image, WIDTH, HEIGHT).unwrap());
    let detector = Detector::new(ResolutionProfile::default());

    for use_region_reduction in [true, false] {
        let a = detector.detect(&frame, &templates, use_region_reduction);
        let b = detector.detect(&frame, &templates, use_region_reduction);
        assert_eq!((a.label, a.score, a.location), (b.label, b.score, b.location));
    }
}

#[test]
fn no_templates_means_no_detection() {
    let mut rng = StdRng::seed_from_u64(4);
    let image = noise(&mut rng, WIDTH * HEIGHT);
    let frame = Frame::gray(ImageView::from_slice(&image, WIDTH, HEIGHT).unwrap());

    let outcome = detect(
        &frame,
        &TemplateCollection::new(),
        &ResolutionProfile::default(),
        true,
    );
    assert_eq!(outcome.label, None);
    assert_eq!(outcome.score, 0.0);
    assert_eq!(outcome.location, None);
}

#[test]
fn crop_smaller_than_every_template_finds_nothing() {
    let mut rng = StdRng::seed_from_u64(5);
    let (templates, salmon) = fish_templates(&mut rng);
    let mut image = noise(&mut rng, WIDTH * HEIGHT);
    paste(&mut image, &salmon, 10, 10);
    let frame = Frame::gray(ImageView::from_slice(&image, WIDTH, HEIGHT).unwrap());
    // 5% of 120 rows is 6, shorter than the 10-row templates.
    let tiny = ResolutionProfile::new("tiny", RegionSpec::new(0.0, 0.0, 0.5, 0.05).unwrap());

    let outcome = Detector::new(tiny).detect(&frame, &templates, true);
    assert_eq!(outcome.label, None);
    assert_eq!(outcome.score, 0.0);
}

#[test]
fn parallel_scan_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(6);
    let (templates, salmon) = fish_templates(&mut rng);
    let mut image = noise(&mut rng, WIDTH * HEIGHT);
    paste(&mut image, &salmon, 70, 82);
    let frame = Frame::gray(ImageView::from_slice(&image, WIDTH, HEIGHT).unwrap());

    let sequential = Detector::new(ResolutionProfile::default());
    let parallel = Detector::new(ResolutionProfile::default()).with_config(MatchConfig {
        parallel: true,
        ..MatchConfig::default()
    });
    for use_region_reduction in [true, false] {
        let a = sequential.detect(&frame, &templates, use_region_reduction);
        let b = parallel.detect(&frame, &templates, use_region_reduction);
        assert_eq!((a.label, a.score, a.location), (b.label, b.score, b.location));
    }
}

#[test]
fn png_screenshot_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    let (templates, salmon) = fish_templates(&mut rng);
    let mut gray = noise(&mut rng, WIDTH * HEIGHT);
    paste(&mut gray, &salmon, 55, 90);

    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("detection_end_to_end");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("salmon_test_200x120.png");
    RgbImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
        let v = gray[y as usize * WIDTH + x as usize];
        Rgb([v, v, v])
    })
    .save(&path)
    .unwrap();

    let buffer = load_frame(&path).unwrap();
    let frame = buffer.frame().unwrap();
    let outcome = detect(&frame, &templates, &ResolutionProfile::default(), true);
    assert_eq!(outcome.label.as_deref(), Some("salmon"));
    assert_eq!(outcome.location, Some((55, 90)));
}
