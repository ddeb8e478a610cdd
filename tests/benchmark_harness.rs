use fishmatch::harness::{
    expected_label, AccuracyRating, Benchmark, BenchmarkConfig, NO_DETECTION, UNKNOWN_LABEL,
};
use fishmatch::{FishMatchError, RegionSpec, ResolutionProfile};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

// 200x120 frames: the default crop is x in [40, 100), y in [78, 120).
const WIDTH: u32 = 200;
const HEIGHT: u32 = 120;
const TPL_W: u32 = 12;
const TPL_H: u32 = 10;

struct Fixture {
    corpus: PathBuf,
    templates: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let root = PathBuf::from(env!("CARGO_TARGET_TMPDIR"))
            .join("benchmark_harness")
            .join(name);
        let _ = fs::remove_dir_all(&root);
        let corpus = root.join("tests/assets/200x120");
        let templates = root.join("images/200x120/fish");
        fs::create_dir_all(&corpus).unwrap();
        fs::create_dir_all(&templates).unwrap();
        Self { corpus, templates }
    }
}

fn noise_image(rng: &mut StdRng, width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |_, _| Luma([rng.random()]))
}

fn write_template(dir: &Path, label: &str, icon: &GrayImage) {
    icon.save(dir.join(format!("{label}.png"))).unwrap();
}

fn write_screenshot(dir: &Path, file: &str, rng: &mut StdRng, icon: Option<(&GrayImage, u32, u32)>) {
    let mut frame = noise_image(rng, WIDTH, HEIGHT);
    if let Some((icon, x0, y0)) = icon {
        for (x, y, px) in icon.enumerate_pixels() {
            frame.put_pixel(x0 + x, y0 + y, *px);
        }
    }
    frame.save(dir.join(file)).unwrap();
}

fn config(min_confidence: f32) -> BenchmarkConfig {
    BenchmarkConfig {
        profile: ResolutionProfile::new("200x120", RegionSpec::default()),
        min_confidence,
        ..BenchmarkConfig::default()
    }
}

/// salmon sits inside the crop, trout only outside it, unknownfish has no
/// template, and one screenshot is not a PNG at all.
fn populated(name: &str) -> Fixture {
    let fx = Fixture::new(name);
    let mut rng = StdRng::seed_from_u64(42);
    let salmon = noise_image(&mut rng, TPL_W, TPL_H);
    let trout = noise_image(&mut rng, TPL_W, TPL_H);
    write_template(&fx.templates, "salmon", &salmon);
    write_template(&fx.templates, "trout", &trout);

    write_screenshot(&fx.corpus, "salmon_test_200x120.png", &mut rng, Some((&salmon, 60, 95)));
    write_screenshot(&fx.corpus, "trout_test_200x120.png", &mut rng, Some((&trout, 150, 20)));
    write_screenshot(&fx.corpus, "unknownfish_test_200x120.png", &mut rng, None);
    fs::write(fx.corpus.join("broken_test_200x120.png"), b"not an image").unwrap();
    fs::write(fx.corpus.join("notes.txt"), b"ignored").unwrap();
    fx
}

#[test]
fn crop_and_full_frame_passes_are_compared() {
    let fx = populated("compare");
    let report = Benchmark::new(config(0.8))
        .run(&fx.corpus, &fx.templates)
        .unwrap();

    assert_eq!(report.profile, "200x120");
    assert_eq!(report.templates, vec!["salmon", "trout"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].test_image_id, "broken_test_200x120.png");

    let ids: Vec<&str> = report
        .cropped
        .results
        .iter()
        .map(|r| r.test_image_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "salmon_test_200x120.png",
            "trout_test_200x120.png",
            "unknownfish_test_200x120.png",
        ]
    );

    let cropped: Vec<bool> = report.cropped.results.iter().map(|r| r.correct).collect();
    let full: Vec<bool> = report.full.results.iter().map(|r| r.correct).collect();
    assert_eq!(cropped, vec![true, false, false]);
    assert_eq!(full, vec![true, true, false]);

    assert_eq!(report.cropped.stats.correct, 1);
    assert_eq!(report.cropped.stats.total, 3);
    assert_eq!(report.full.stats.correct, 2);
    let delta = report.comparison.accuracy_delta_pct;
    assert!((delta + 100.0 / 3.0).abs() < 1e-9, "delta {delta}");
    assert_eq!(report.assessment.accuracy, AccuracyRating::Low);
    assert!(report.assessment.adjust_region);
}

#[test]
fn unknown_fish_is_listed_as_misdetection() {
    let fx = populated("misdetections");
    let report = Benchmark::new(config(0.8))
        .run(&fx.corpus, &fx.templates)
        .unwrap();

    let unknown = report
        .misdetections
        .iter()
        .find(|m| m.test_image_id == "unknownfish_test_200x120.png")
        .expect("unknownfish misdetected");
    assert_eq!(unknown.expected_label, "unknownfish");
    assert_eq!(unknown.detected_label, NO_DETECTION);

    let trout = report
        .misdetections
        .iter()
        .find(|m| m.test_image_id == "trout_test_200x120.png")
        .expect("trout misdetected with cropping");
    assert_eq!(trout.detected_label, NO_DETECTION);
    assert_eq!(report.misdetections.len(), 2);

    let text = report.to_string();
    assert!(text.contains("unknownfish_test_200x120.png"));
    assert!(text.contains("Skipped broken_test_200x120.png"));
}

#[test]
fn default_threshold_still_rejects_unknown_fish() {
    let fx = populated("default_threshold");
    let report = fishmatch::harness::run(&fx.corpus, &fx.templates).unwrap();

    let unknown = &report.cropped.results[2];
    assert_eq!(unknown.expected_label.as_deref(), Some("unknownfish"));
    assert!(!unknown.correct);
    assert!(report.cropped.results[0].correct);
    assert!(report.full.results[1].correct);
}

#[test]
fn empty_template_directory_detects_nothing() {
    let fx = Fixture::new("no_templates");
    let mut rng = StdRng::seed_from_u64(9);
    write_screenshot(&fx.corpus, "salmon_test_200x120.png", &mut rng, None);
    write_screenshot(&fx.corpus, "trout_test_200x120.png", &mut rng, None);

    let report = Benchmark::new(config(0.0))
        .run(&fx.corpus, &fx.templates)
        .unwrap();
    assert!(report.templates.is_empty());
    for pass in [&report.cropped, &report.full] {
        assert_eq!(pass.stats.total, 2);
        assert_eq!(pass.stats.accuracy_pct, 0.0);
        for result in &pass.results {
            assert_eq!(result.detected_label, None);
            assert_eq!(result.confidence, 0.0);
        }
    }
}

#[test]
fn empty_corpus_reports_zero_accuracy() {
    let fx = Fixture::new("empty_corpus");
    let mut rng = StdRng::seed_from_u64(10);
    write_template(&fx.templates, "salmon", &noise_image(&mut rng, TPL_W, TPL_H));

    let report = Benchmark::new(config(0.0))
        .run(&fx.corpus, &fx.templates)
        .unwrap();
    assert_eq!(report.cropped.stats.total, 0);
    assert_eq!(report.cropped.stats.accuracy_pct, 0.0);
    assert_eq!(report.cropped.stats.avg_ms, 0.0);
    assert_eq!(report.full.stats.accuracy_pct, 0.0);
    assert!(report.misdetections.is_empty());
}

#[test]
fn missing_directories_are_reported_by_path() {
    let fx = Fixture::new("missing");
    let absent = fx.corpus.join("nope");

    let err = Benchmark::default().run(&absent, &fx.templates).unwrap_err();
    assert_eq!(err, FishMatchError::MissingDirectory { path: absent.clone() });

    let err = Benchmark::default().run(&fx.corpus, &absent).unwrap_err();
    assert_eq!(err, FishMatchError::MissingDirectory { path: absent });
}

#[test]
fn unlabeled_screenshots_expect_unknown() {
    assert_eq!(expected_label("screenshot.png"), UNKNOWN_LABEL);
    assert_eq!(expected_label("salmon_test_200x120.png"), "salmon");

    let fx = Fixture::new("unlabeled");
    let mut rng = StdRng::seed_from_u64(11);
    write_screenshot(&fx.corpus, "screenshot.png", &mut rng, None);
    let report = Benchmark::new(config(0.0))
        .run(&fx.corpus, &fx.templates)
        .unwrap();
    assert_eq!(
        report.cropped.results[0].expected_label.as_deref(),
        Some(UNKNOWN_LABEL)
    );
}

#[test]
fn concurrent_passes_match_sequential_ones() {
    let fx = populated("concurrent");
    let sequential = Benchmark::new(config(0.8))
        .run(&fx.corpus, &fx.templates)
        .unwrap();
    let concurrent = Benchmark::new(BenchmarkConfig {
        parallel: true,
        ..config(0.8)
    })
    .run(&fx.corpus, &fx.templates)
    .unwrap();

    let summary = |pass: &fishmatch::harness::PassReport| -> Vec<(String, Option<String>, f32)> {
        pass.results
            .iter()
            .map(|r| (r.test_image_id.clone(), r.detected_label.clone(), r.confidence))
            .collect()
    };
    assert_eq!(summary(&sequential.cropped), summary(&concurrent.cropped));
    assert_eq!(summary(&sequential.full), summary(&concurrent.full));
}

#[cfg(feature = "serde")]
#[test]
fn report_serializes_to_json() {
    let fx = populated("json");
    let report = Benchmark::new(config(0.8))
        .run(&fx.corpus, &fx.templates)
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["profile"], "200x120");
    assert_eq!(json["cropped"]["stats"]["correct"], 1);
    assert_eq!(json["full"]["results"][1]["detected_label"], "trout");
    assert_eq!(json["misdetections"][0]["detected_label"], NO_DETECTION);
    assert_eq!(json["assessment"]["accuracy"], "Low");
}
