//! End-to-end detection on a single frame.

use crate::image::Frame;
use crate::region::{reduce, PixelRect, ResolutionProfile};
use crate::search::{best_match, MatchConfig};
use crate::template::TemplateCollection;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::ImageView;
use std::time::Instant;

/// What a single detection found and how long it took.
///
/// No acceptance threshold is applied; see [`DetectionOutcome::accepted_label`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetectionOutcome {
    /// Best label, `None` when no template produced a positive score.
    pub label: Option<String>,
    /// Peak ZNCC score of `label`, `0.0` without a label.
    pub score: f32,
    /// Wall-clock time of the whole call in milliseconds.
    pub elapsed_ms: f64,
    /// Top-left of the best placement in frame coordinates.
    pub location: Option<(usize, usize)>,
    /// Rectangle that was searched, `None` when the full frame was searched.
    pub region: Option<PixelRect>,
}

impl DetectionOutcome {
    /// Returns the label only when its score reaches `min_confidence`.
    pub fn accepted_label(&self, min_confidence: f32) -> Option<&str> {
        self.label
            .as_deref()
            .filter(|_| self.score >= min_confidence)
    }

    /// Drops the label and its location when the score is below
    /// `min_confidence`. Score, timing and searched region are kept.
    pub fn thresholded(mut self, min_confidence: f32) -> Self {
        if self.accepted_label(min_confidence).is_none() {
            self.label = None;
            self.location = None;
        }
        self
    }
}

/// Detection engine bound to one resolution profile.
#[derive(Clone, Debug, Default)]
pub struct Detector {
    profile: ResolutionProfile,
    match_cfg: MatchConfig,
}

impl Detector {
    /// Creates a detector for `profile` with default matching parameters.
    pub fn new(profile: ResolutionProfile) -> Self {
        Self {
            profile,
            match_cfg: MatchConfig::default(),
        }
    }

    /// Replaces the matching parameters.
    pub fn with_config(mut self, match_cfg: MatchConfig) -> Self {
        self.match_cfg = match_cfg;
        self
    }

    /// Returns the resolution profile.
    pub fn profile(&self) -> &ResolutionProfile {
        &self.profile
    }

    /// Returns the matching parameters.
    pub fn config(&self) -> &MatchConfig {
        &self.match_cfg
    }

    /// Identifies the icon in `frame`.
    ///
    /// With `use_region_reduction` only the profile's crop is searched; a crop
    /// that falls outside the frame degrades to a full-frame search.
    pub fn detect(
        &self,
        frame: &Frame<'_>,
        templates: &TemplateCollection,
        use_region_reduction: bool,
    ) -> DetectionOutcome {
        let _span = trace_span!("detect", use_region_reduction).entered();
        let start = Instant::now();

        let pixels = match frame.to_gray() {
            Ok(pixels) => pixels,
            Err(err) => {
                trace_warn!("frame_unusable", reason = err.to_string().as_str());
                return DetectionOutcome {
                    label: None,
                    score: 0.0,
                    elapsed_ms: elapsed_ms(start),
                    location: None,
                    region: None,
                };
            }
        };
        let gray = pixels.view();

        let (candidate, region) = if use_region_reduction {
            candidate_region(gray, &self.profile)
        } else {
            (gray, None)
        };

        let best = best_match(candidate, templates, &self.match_cfg);
        let (ox, oy) = region.map_or((0, 0), |r| (r.x, r.y));
        let outcome = DetectionOutcome {
            location: best.location.map(|(x, y)| (x + ox, y + oy)),
            label: best.label,
            score: best.score,
            elapsed_ms: elapsed_ms(start),
            region,
        };

        trace_event!(
            "detection",
            label = outcome.label.as_deref().unwrap_or("NONE"),
            score = outcome.score,
            elapsed_ms = outcome.elapsed_ms
        );
        outcome
    }
}

/// Identifies the icon in `frame` using `profile` and default matching
/// parameters.
pub fn detect(
    frame: &Frame<'_>,
    templates: &TemplateCollection,
    profile: &ResolutionProfile,
    use_region_reduction: bool,
) -> DetectionOutcome {
    Detector::new(profile.clone()).detect(frame, templates, use_region_reduction)
}

fn candidate_region<'a>(
    gray: ImageView<'a, u8>,
    profile: &ResolutionProfile,
) -> (ImageView<'a, u8>, Option<PixelRect>) {
    let cropped = reduce(gray.width(), gray.height(), profile.region())
        .and_then(|rect| Ok((gray.roi(rect.x, rect.y, rect.width, rect.height)?, rect)));
    match cropped {
        Ok((view, rect)) => (view, Some(rect)),
        Err(err) => {
            trace_warn!(
                "region_fallback",
                profile = profile.name(),
                reason = err.to_string().as_str()
            );
            (gray, None)
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
