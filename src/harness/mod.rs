//! Accuracy and latency benchmark over a labeled screenshot corpus.
//!
//! Every corpus image is detected twice, once inside the profile's crop
//! region and once over the full frame, and the two passes are compared.

mod corpus;
mod report;

pub use corpus::{corpus_images, expected_label, CORPUS_EXTENSION, UNKNOWN_LABEL};
pub use report::{
    AccuracyRating, Assessment, BenchmarkReport, Comparison, DetectionResult, Misdetection,
    PassReport, PassStats, SkippedImage, SpeedRating, NO_DETECTION,
};

use crate::detect::Detector;
use crate::image::io::{load_frame, FrameBuffer};
use crate::region::ResolutionProfile;
use crate::search::MatchConfig;
use crate::template::{load_templates, TemplateCollection};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{FishMatchError, FishMatchResult};
use std::path::Path;
use std::time::Instant;

/// Benchmark parameters.
#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub profile: ResolutionProfile,
    pub match_cfg: MatchConfig,
    /// Detections scoring below this are counted as "nothing found".
    pub min_confidence: f32,
    /// Run the cropped and full-frame passes concurrently (requires the
    /// `rayon` feature).
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            profile: ResolutionProfile::default(),
            match_cfg: MatchConfig::default(),
            min_confidence: 0.0,
            parallel: false,
        }
    }
}

/// Runs the crop-vs-full-frame benchmark.
#[derive(Clone, Debug, Default)]
pub struct Benchmark {
    cfg: BenchmarkConfig,
}

/// A decoded corpus image shared by both passes.
struct CorpusEntry {
    id: String,
    expected: String,
    buffer: FrameBuffer,
}

impl Benchmark {
    pub fn new(cfg: BenchmarkConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.cfg
    }

    /// Benchmarks the templates in `template_dir` against the corpus in
    /// `corpus_dir`.
    ///
    /// Fails only when one of the directories does not exist; unreadable
    /// templates and corpus images are skipped.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        corpus_dir: P,
        template_dir: Q,
    ) -> FishMatchResult<BenchmarkReport> {
        let corpus_dir = corpus_dir.as_ref();
        let template_dir = template_dir.as_ref();
        for dir in [corpus_dir, template_dir] {
            if !dir.is_dir() {
                return Err(FishMatchError::MissingDirectory {
                    path: dir.to_path_buf(),
                });
            }
        }

        let start = Instant::now();
        let templates = load_templates(template_dir);
        let template_load_ms = start.elapsed().as_secs_f64() * 1000.0;
        Ok(self.run_with_templates(corpus_dir, &templates, template_load_ms))
    }

    /// Benchmarks an already loaded collection against the corpus in
    /// `corpus_dir`. A missing corpus directory counts as an empty corpus.
    pub fn run_with_templates(
        &self,
        corpus_dir: &Path,
        templates: &TemplateCollection,
        template_load_ms: f64,
    ) -> BenchmarkReport {
        let _span = trace_span!("benchmark", profile = self.cfg.profile.name()).entered();

        let (entries, skipped) = load_corpus(corpus_dir);
        trace_event!("corpus_loaded", images = entries.len(), skipped = skipped.len());

        let detector =
            Detector::new(self.cfg.profile.clone()).with_config(self.cfg.match_cfg.clone());
        let (cropped, full) = self.both_passes(&detector, &entries, templates);

        let report = BenchmarkReport::assemble(
            self.cfg.profile.name().to_owned(),
            templates.labels().map(str::to_owned).collect(),
            template_load_ms,
            PassReport::new(true, cropped),
            PassReport::new(false, full),
            skipped,
        );
        trace_event!(
            "benchmark_done",
            cropped_accuracy = report.cropped.stats.accuracy_pct,
            full_accuracy = report.full.stats.accuracy_pct,
            cropped_avg_ms = report.cropped.stats.avg_ms,
            full_avg_ms = report.full.stats.avg_ms
        );
        report
    }

    fn both_passes(
        &self,
        detector: &Detector,
        entries: &[CorpusEntry],
        templates: &TemplateCollection,
    ) -> (Vec<DetectionResult>, Vec<DetectionResult>) {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return rayon::join(
                || self.pass(detector, entries, templates, true),
                || self.pass(detector, entries, templates, false),
            );
        }
        (
            self.pass(detector, entries, templates, true),
            self.pass(detector, entries, templates, false),
        )
    }

    fn pass(
        &self,
        detector: &Detector,
        entries: &[CorpusEntry],
        templates: &TemplateCollection,
        use_region_reduction: bool,
    ) -> Vec<DetectionResult> {
        let _span = trace_span!("benchmark_pass", use_region_reduction).entered();
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            // Validated in `load_corpus`.
            let Ok(frame) = entry.buffer.frame() else {
                continue;
            };
            let outcome = detector.detect(&frame, templates, use_region_reduction);
            let detected = outcome
                .accepted_label(self.cfg.min_confidence)
                .map(str::to_owned);
            let result = DetectionResult::new(
                entry.id.clone(),
                Some(entry.expected.clone()),
                detected,
                outcome.score,
                outcome.elapsed_ms,
            );
            trace_event!(
                "benchmark_image",
                image = result.test_image_id.as_str(),
                correct = result.correct,
                score = result.confidence,
                elapsed_ms = result.elapsed_ms
            );
            results.push(result);
        }
        results
    }
}

/// Decodes every corpus image once, in path order.
///
/// Images that cannot be decoded or framed are reported as skipped.
fn load_corpus(corpus_dir: &Path) -> (Vec<CorpusEntry>, Vec<SkippedImage>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for path in corpus_images(corpus_dir) {
        let Some(id) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        let loaded = load_frame(&path).and_then(|buffer| {
            buffer.frame()?;
            Ok(buffer)
        });
        match loaded {
            Ok(buffer) => entries.push(CorpusEntry {
                expected: expected_label(&id),
                id,
                buffer,
            }),
            Err(err) => {
                trace_warn!(
                    "image_skipped",
                    image = id.as_str(),
                    reason = err.to_string().as_str()
                );
                skipped.push(SkippedImage {
                    test_image_id: id,
                    reason: err.to_string(),
                });
            }
        }
    }
    (entries, skipped)
}

/// Runs the benchmark with default settings.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    corpus_dir: P,
    template_dir: Q,
) -> FishMatchResult<BenchmarkReport> {
    Benchmark::default().run(corpus_dir, template_dir)
}
