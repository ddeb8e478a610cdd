//! Multi-template search: which label fits the candidate region best.
//!
//! Every template is scanned over the candidate with masked or plain ZNCC and
//! reduced to its peak score. The label with the highest positive peak wins;
//! equal peaks keep the template met first in collection order.

pub(crate) mod scan;

pub use scan::{evaluate_template, SkipReason, TemplateScore};

use crate::kernel::{IntegralView, Peak};
use crate::template::TemplateCollection;
use crate::trace::trace_debug;
use crate::ImageView;

/// Matching parameters.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Per-pixel variance at or below which an image window is not scored.
    pub min_var_i: f64,
    /// Score placement rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_var_i: 1e-8,
            parallel: false,
        }
    }
}

/// Outcome of one template against one candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateEvaluation<'a> {
    pub label: &'a str,
    pub score: TemplateScore,
}

/// Best label over a template collection.
#[derive(Clone, Debug, PartialEq)]
pub struct BestMatch {
    /// Winning label, `None` when no template produced a positive score.
    pub label: Option<String>,
    /// Peak score of the winner, `0.0` without a winner.
    pub score: f32,
    /// Top-left of the winning placement in candidate coordinates.
    pub location: Option<(usize, usize)>,
}

impl BestMatch {
    /// The "nothing found" result.
    pub fn none() -> Self {
        Self {
            label: None,
            score: 0.0,
            location: None,
        }
    }
}

/// Scores every template in collection order.
pub fn evaluate<'a>(
    candidate: ImageView<'_, u8>,
    templates: &'a TemplateCollection,
    cfg: &MatchConfig,
) -> Vec<TemplateEvaluation<'a>> {
    if templates.is_empty() {
        return Vec::new();
    }
    let integral = IntegralView::new(candidate);
    templates
        .iter()
        .map(|template| TemplateEvaluation {
            label: template.label(),
            score: scan::score_template(&integral, template, cfg),
        })
        .collect()
}

/// Reduces per-template evaluations to the single best label.
///
/// The running best starts at a score of `0.0` and is only replaced by a
/// strictly higher peak.
pub fn select_best(evaluations: &[TemplateEvaluation<'_>]) -> BestMatch {
    let mut best = BestMatch::none();
    for evaluation in evaluations {
        match &evaluation.score {
            TemplateScore::Scored(Peak { x, y, score }) => {
                trace_debug!("template_scored", label = evaluation.label, score = *score);
                if *score > best.score {
                    best = BestMatch {
                        label: Some(evaluation.label.to_owned()),
                        score: *score,
                        location: Some((*x, *y)),
                    };
                }
            }
            TemplateScore::Skipped(reason) => {
                trace_debug!(
                    "template_skipped",
                    label = evaluation.label,
                    reason = format!("{reason:?}").as_str()
                );
            }
        }
    }
    best
}

/// Finds the best-matching label for `candidate`.
///
/// Templates that do not fit or cannot be scored are skipped; an empty or
/// fully skipped collection yields [`BestMatch::none`].
pub fn best_match(
    candidate: ImageView<'_, u8>,
    templates: &TemplateCollection,
    cfg: &MatchConfig,
) -> BestMatch {
    select_best(&evaluate(candidate, templates, cfg))
}
