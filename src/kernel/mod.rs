//! Correlation kernel implementations.
//!
//! A kernel scores one template placement; the scan helpers sweep every valid
//! placement of a template over a candidate image and keep the best peak.

use crate::util::{FishMatchError, FishMatchResult};
use crate::ImageView;

pub(crate) mod integral;
pub(crate) mod scalar;

pub(crate) use integral::IntegralView;

#[cfg(feature = "rayon")]
pub(crate) mod rayon;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Per-pixel variance threshold below which an image window is not scored.
    pub min_var_i: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { min_var_i: 1e-8 }
    }
}

/// Best placement of one template inside a candidate image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the placement's top-left corner.
    pub y: usize,
    /// ZNCC score at the placement.
    pub score: f32,
}

impl Peak {
    /// Returns `true` if `self` should replace `other` as the best peak.
    ///
    /// Higher scores win; equal scores keep the earlier placement in row-major
    /// order, so every scan order picks the same peak.
    pub(crate) fn beats(&self, other: &Peak) -> bool {
        self.score > other.score
            || (self.score == other.score && (self.y, self.x) < (other.y, other.x))
    }
}

/// Kernel trait for scoring a single placement.
pub(crate) trait Kernel {
    type Plan: Sync;

    /// Template width in pixels.
    fn plan_width(plan: &Self::Plan) -> usize;

    /// Template height in pixels.
    fn plan_height(plan: &Self::Plan) -> usize;

    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Returns `None` when the placement does not fit or the image window is
    /// too flat for the correlation to be defined.
    fn score_at(
        candidate: &IntegralView<'_>,
        plan: &Self::Plan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> Option<f64>;
}

/// Range of valid top-left placements, inclusive.
pub(crate) fn placement_range(
    image: ImageView<'_, u8>,
    tpl_width: usize,
    tpl_height: usize,
) -> FishMatchResult<(usize, usize)> {
    let img_width = image.width();
    let img_height = image.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(FishMatchError::RoiOutOfBounds {
            x: 0,
            y: 0,
            width: tpl_width,
            height: tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width, img_height - tpl_height))
}

/// Best peak among the placements of row `y`.
pub(crate) fn scan_row<K: Kernel>(
    candidate: &IntegralView<'_>,
    plan: &K::Plan,
    y: usize,
    max_x: usize,
    params: ScanParams,
) -> Option<Peak> {
    let mut best: Option<Peak> = None;
    for x in 0..=max_x {
        let Some(score) = K::score_at(candidate, plan, x, y, params) else {
            continue;
        };
        let peak = Peak {
            x,
            y,
            score: score as f32,
        };
        if best.map_or(true, |b| peak.beats(&b)) {
            best = Some(peak);
        }
    }
    best
}

/// Folds per-row peaks into the overall best peak.
pub(crate) fn merge_peaks<I: IntoIterator<Item = Option<Peak>>>(peaks: I) -> Option<Peak> {
    peaks
        .into_iter()
        .flatten()
        .fold(None, |best: Option<Peak>, peak| match best {
            Some(b) if !peak.beats(&b) => Some(b),
            _ => Some(peak),
        })
}

#[cfg(test)]
mod tests {
    use super::{merge_peaks, Peak};

    #[test]
    fn ties_keep_the_earliest_placement() {
        let a = Peak {
            x: 5,
            y: 1,
            score: 0.5,
        };
        let b = Peak {
            x: 0,
            y: 2,
            score: 0.5,
        };
        let c = Peak {
            x: 3,
            y: 3,
            score: 0.25,
        };
        assert_eq!(merge_peaks([Some(b), None, Some(a), Some(c)]), Some(a));
        assert_eq!(merge_peaks([None, None]), None);
    }
}
