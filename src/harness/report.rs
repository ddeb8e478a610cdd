//! Benchmark result types, aggregation, and the plain-text report.

use crate::util::math::{mean, percent};
use std::fmt;

/// Label printed when a detection found nothing.
pub const NO_DETECTION: &str = "NONE";

/// One corpus image run through the detector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetectionResult {
    /// Corpus file name.
    pub test_image_id: String,
    pub expected_label: Option<String>,
    pub detected_label: Option<String>,
    pub confidence: f32,
    pub elapsed_ms: f64,
    /// `true` only when a label was detected and it equals the expected one.
    pub correct: bool,
}

impl DetectionResult {
    pub(crate) fn new(
        test_image_id: String,
        expected_label: Option<String>,
        detected_label: Option<String>,
        confidence: f32,
        elapsed_ms: f64,
    ) -> Self {
        let correct = matches!(
            (&detected_label, &expected_label),
            (Some(detected), Some(expected)) if detected == expected
        );
        Self {
            test_image_id,
            expected_label,
            detected_label,
            confidence,
            elapsed_ms,
            correct,
        }
    }
}

/// Aggregate numbers for one pass over the corpus.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PassStats {
    pub correct: usize,
    pub total: usize,
    /// Percentage of correct detections, `0.0` for an empty pass.
    pub accuracy_pct: f64,
    pub avg_ms: f64,
    pub total_ms: f64,
}

impl PassStats {
    /// Aggregates per-image results.
    pub fn from_results(results: &[DetectionResult]) -> Self {
        let correct = results.iter().filter(|r| r.correct).count();
        let times: Vec<f64> = results.iter().map(|r| r.elapsed_ms).collect();
        Self {
            correct,
            total: results.len(),
            accuracy_pct: percent(correct, results.len()),
            avg_ms: mean(&times),
            total_ms: times.iter().sum(),
        }
    }
}

/// Every result of one pass plus its aggregates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PassReport {
    pub use_region_reduction: bool,
    pub results: Vec<DetectionResult>,
    pub stats: PassStats,
}

impl PassReport {
    pub(crate) fn new(use_region_reduction: bool, results: Vec<DetectionResult>) -> Self {
        let stats = PassStats::from_results(&results);
        Self {
            use_region_reduction,
            results,
            stats,
        }
    }

    fn title(&self) -> &'static str {
        if self.use_region_reduction {
            "WITH CROPPING"
        } else {
            "WITHOUT CROPPING (FULL IMAGE)"
        }
    }
}

/// Cropped pass minus full-frame pass.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Comparison {
    pub accuracy_delta_pct: f64,
    pub avg_ms_delta: f64,
    pub total_ms_delta: f64,
}

impl Comparison {
    pub fn between(cropped: &PassStats, full: &PassStats) -> Self {
        Self {
            accuracy_delta_pct: cropped.accuracy_pct - full.accuracy_pct,
            avg_ms_delta: cropped.avg_ms - full.avg_ms,
            total_ms_delta: cropped.total_ms - full.total_ms,
        }
    }
}

/// Accuracy band of the cropped pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AccuracyRating {
    Excellent,
    Good,
    Low,
}

impl AccuracyRating {
    pub fn from_pct(accuracy_pct: f64) -> Self {
        if accuracy_pct >= 90.0 {
            AccuracyRating::Excellent
        } else if accuracy_pct >= 70.0 {
            AccuracyRating::Good
        } else {
            AccuracyRating::Low
        }
    }
}

/// Speed band of the cropped pass's average detection time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SpeedRating {
    Fast,
    Acceptable,
    Slow,
}

impl SpeedRating {
    pub fn from_avg_ms(avg_ms: f64) -> Self {
        if avg_ms < 100.0 {
            SpeedRating::Fast
        } else if avg_ms < 500.0 {
            SpeedRating::Acceptable
        } else {
            SpeedRating::Slow
        }
    }
}

/// Verdict on the cropped configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Assessment {
    pub accuracy: AccuracyRating,
    pub speed: SpeedRating,
    /// Set when searching the whole frame was more accurate than the crop,
    /// which usually means the crop region needs adjusting.
    pub adjust_region: bool,
}

impl Assessment {
    pub fn of(cropped: &PassStats, full: &PassStats) -> Self {
        Self {
            accuracy: AccuracyRating::from_pct(cropped.accuracy_pct),
            speed: SpeedRating::from_avg_ms(cropped.avg_ms),
            adjust_region: full.accuracy_pct > cropped.accuracy_pct,
        }
    }
}

/// Wrong or missing detection from the cropped pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Misdetection {
    pub test_image_id: String,
    pub expected_label: String,
    /// Detected label, [`NO_DETECTION`] when nothing was found.
    pub detected_label: String,
    pub score: f32,
}

impl Misdetection {
    pub(crate) fn collect(results: &[DetectionResult]) -> Vec<Misdetection> {
        results
            .iter()
            .filter(|r| !r.correct)
            .map(|r| Misdetection {
                test_image_id: r.test_image_id.clone(),
                expected_label: r
                    .expected_label
                    .clone()
                    .unwrap_or_else(|| super::UNKNOWN_LABEL.to_owned()),
                detected_label: r
                    .detected_label
                    .clone()
                    .unwrap_or_else(|| NO_DETECTION.to_owned()),
                score: r.confidence,
            })
            .collect()
    }
}

/// Corpus file that could not be loaded and was left out of both passes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkippedImage {
    pub test_image_id: String,
    pub reason: String,
}

/// Full outcome of a benchmark run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BenchmarkReport {
    /// Resolution profile the run used.
    pub profile: String,
    /// Loaded template labels in collection order.
    pub templates: Vec<String>,
    pub template_load_ms: f64,
    pub cropped: PassReport,
    pub full: PassReport,
    pub comparison: Comparison,
    pub assessment: Assessment,
    pub misdetections: Vec<Misdetection>,
    pub skipped: Vec<SkippedImage>,
}

impl BenchmarkReport {
    pub(crate) fn assemble(
        profile: String,
        templates: Vec<String>,
        template_load_ms: f64,
        cropped: PassReport,
        full: PassReport,
        skipped: Vec<SkippedImage>,
    ) -> Self {
        let comparison = Comparison::between(&cropped.stats, &full.stats);
        let assessment = Assessment::of(&cropped.stats, &full.stats);
        let misdetections = Misdetection::collect(&cropped.results);
        Self {
            profile,
            templates,
            template_load_ms,
            cropped,
            full,
            comparison,
            assessment,
            misdetections,
            skipped,
        }
    }
}

const TABLE_WIDTH: usize = 125;

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<45} | {:<25} | {:<25} | {:>8} | {:>10}",
            "Test Image", "Expected", "Detected", "Score", "Time (ms)"
        )?;
        writeln!(f, "{}", "-".repeat(TABLE_WIDTH))?;
        for r in &self.results {
            writeln!(
                f,
                "{} {:<42} | {:<25} | {:<25} | {:>7.3} | {:>10.2}",
                if r.correct { "✓" } else { "✗" },
                r.test_image_id,
                r.expected_label.as_deref().unwrap_or(super::UNKNOWN_LABEL),
                r.detected_label.as_deref().unwrap_or(NO_DETECTION),
                r.confidence,
                r.elapsed_ms
            )?;
        }
        writeln!(f, "\n{}", "=".repeat(TABLE_WIDTH))?;
        writeln!(f, "RESULTS {}:", self.title())?;
        let s = &self.stats;
        writeln!(
            f,
            "  Accuracy: {}/{} ({:.1}%)",
            s.correct, s.total, s.accuracy_pct
        )?;
        writeln!(f, "  Average detection time: {:.2}ms", s.avg_ms)?;
        writeln!(f, "  Total detection time: {:.2}ms", s.total_ms)
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== FISH DETECTION BENCHMARK ({}) ==========\n", self.profile)?;
        writeln!(
            f,
            "Loaded {} templates in {:.2}ms\n",
            self.templates.len(),
            self.template_load_ms
        )?;
        writeln!(f, "Available templates:")?;
        for label in &self.templates {
            writeln!(f, "  - {label}")?;
        }
        writeln!(f)?;
        writeln!(f, "Found {} test images", self.cropped.stats.total)?;
        for skipped in &self.skipped {
            writeln!(f, "  Skipped {}: {}", skipped.test_image_id, skipped.reason)?;
        }

        writeln!(f, "\n========== TEST {} ==========\n", self.cropped.title())?;
        write!(f, "{}", self.cropped)?;
        writeln!(f, "\n\n========== TEST {} ==========\n", self.full.title())?;
        write!(f, "{}", self.full)?;

        let (c, u, d) = (&self.cropped.stats, &self.full.stats, &self.comparison);
        writeln!(f, "\n\n========== COMPARISON ==========\n")?;
        writeln!(
            f,
            "                    | WITH CROPPING | WITHOUT CROPPING | DIFFERENCE"
        )?;
        writeln!(f, "{}", "-".repeat(75))?;
        writeln!(
            f,
            "Accuracy            | {:>12.1}% | {:>15.1}% | {:>+10.1}%",
            c.accuracy_pct, u.accuracy_pct, d.accuracy_delta_pct
        )?;
        writeln!(
            f,
            "Avg Detection Time  | {:>11.2}ms | {:>14.2}ms | {:>+10.2}ms",
            c.avg_ms, u.avg_ms, d.avg_ms_delta
        )?;
        writeln!(
            f,
            "Total Time          | {:>11.2}ms | {:>14.2}ms | {:>+10.2}ms",
            c.total_ms, u.total_ms, d.total_ms_delta
        )?;

        writeln!(f, "\n\n========== SUMMARY ==========\n")?;
        match self.assessment.accuracy {
            AccuracyRating::Excellent => writeln!(
                f,
                "✓ Detection accuracy with cropping is EXCELLENT ({:.1}%)",
                c.accuracy_pct
            )?,
            AccuracyRating::Good => writeln!(
                f,
                "⚠ Detection accuracy with cropping is GOOD ({:.1}%), but could be improved",
                c.accuracy_pct
            )?,
            AccuracyRating::Low => writeln!(
                f,
                "✗ Detection accuracy with cropping is LOW ({:.1}%), needs tuning",
                c.accuracy_pct
            )?,
        }
        if self.assessment.adjust_region {
            writeln!(
                f,
                "⚠ Full image detection has higher accuracy - consider adjusting the crop region"
            )?;
        }
        match self.assessment.speed {
            SpeedRating::Fast => {
                writeln!(f, "✓ Detection speed is FAST ({:.2}ms average)", c.avg_ms)?
            }
            SpeedRating::Acceptable => {
                writeln!(f, "⚠ Detection speed is ACCEPTABLE ({:.2}ms average)", c.avg_ms)?
            }
            SpeedRating::Slow => writeln!(
                f,
                "✗ Detection speed is SLOW ({:.2}ms average), needs optimization",
                c.avg_ms
            )?,
        }

        writeln!(f, "\n\n========== MISDETECTIONS ANALYSIS ==========\n")?;
        if self.misdetections.is_empty() {
            writeln!(f, "No misdetections with cropping!")?;
        } else {
            writeln!(
                f,
                "Found {} misdetections with cropping:\n",
                self.misdetections.len()
            )?;
            for m in &self.misdetections {
                writeln!(f, "  {}", m.test_image_id)?;
                writeln!(f, "    Expected: {}", m.expected_label)?;
                writeln!(f, "    Detected: {} (score: {:.3})", m.detected_label, m.score)?;
                writeln!(f)?;
            }
        }
        writeln!(f, "\n========== END OF BENCHMARK ==========")
    }
}
