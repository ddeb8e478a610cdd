//! Per-template dense scan over a candidate region.

use crate::kernel::scalar::{scan_best, ZnccMaskedScalar, ZnccUnmaskedScalar};
use crate::kernel::{IntegralView, Kernel, Peak, ScanParams};
use crate::search::MatchConfig;
use crate::template::{MatchPlan, Template};
use crate::util::{FishMatchError, FishMatchResult};
use crate::ImageView;

/// Why a template produced no score.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SkipReason {
    /// The template is not strictly smaller than the candidate in both axes.
    TooLarge {
        template_width: usize,
        template_height: usize,
        candidate_width: usize,
        candidate_height: usize,
    },
    /// The (masked) template has no intensity variation.
    Degenerate(&'static str),
    /// Every image window under the template was too flat to correlate.
    NoValidPlacement,
}

/// Result of scanning one template, either a peak or the reason it was skipped.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateScore {
    Scored(Peak),
    Skipped(SkipReason),
}

/// Scores one template over every placement in `candidate`.
///
/// Never fails: any problem with this template is reported as a
/// [`SkipReason`] so the caller can move on to the next one.
pub fn evaluate_template(
    candidate: ImageView<'_, u8>,
    template: &Template,
    cfg: &MatchConfig,
) -> TemplateScore {
    score_template(&IntegralView::new(candidate), template, cfg)
}

/// [`evaluate_template`] over a candidate whose integral tables are already
/// built, so a whole collection shares them.
pub(crate) fn score_template(
    integral: &IntegralView<'_>,
    template: &Template,
    cfg: &MatchConfig,
) -> TemplateScore {
    let candidate = integral.image();
    if template.width() >= candidate.width() || template.height() >= candidate.height() {
        return TemplateScore::Skipped(SkipReason::TooLarge {
            template_width: template.width(),
            template_height: template.height(),
            candidate_width: candidate.width(),
            candidate_height: candidate.height(),
        });
    }

    let plan = match template.plan() {
        Ok(plan) => plan,
        Err(FishMatchError::DegenerateTemplate { reason }) => {
            return TemplateScore::Skipped(SkipReason::Degenerate(reason));
        }
        Err(_) => return TemplateScore::Skipped(SkipReason::Degenerate("invalid template")),
    };

    let params = ScanParams {
        min_var_i: cfg.min_var_i,
    };
    let peak = match plan {
        MatchPlan::Unmasked(plan) => {
            scan_plan::<ZnccUnmaskedScalar>(integral, plan, params, cfg.parallel)
        }
        MatchPlan::Masked(plan) => scan_plan::<ZnccMaskedScalar>(integral, plan, params, cfg.parallel),
    };

    match peak {
        Ok(Some(peak)) => TemplateScore::Scored(peak),
        Ok(None) | Err(_) => TemplateScore::Skipped(SkipReason::NoValidPlacement),
    }
}

fn scan_plan<K: Kernel>(
    candidate: &IntegralView<'_>,
    plan: &K::Plan,
    params: ScanParams,
    parallel: bool,
) -> FishMatchResult<Option<Peak>> {
    #[cfg(feature = "rayon")]
    if parallel {
        return crate::kernel::rayon::scan_best_par::<K>(candidate, plan, params);
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    scan_best::<K>(candidate, plan, params)
}
