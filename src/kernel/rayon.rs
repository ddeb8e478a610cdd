//! Rayon-parallel scan helpers (feature-gated).
//!
//! Rows of placements are scored in parallel and merged with the same
//! tie-breaking as the scalar scan, so both paths report the identical peak.

use crate::kernel::{merge_peaks, placement_range, scan_row, IntegralView, Kernel, Peak, ScanParams};
use crate::util::FishMatchResult;
use rayon::prelude::*;

/// Row-parallel full scan returning the best peak.
pub(crate) fn scan_best_par<K: Kernel>(
    candidate: &IntegralView<'_>,
    plan: &K::Plan,
    params: ScanParams,
) -> FishMatchResult<Option<Peak>> {
    let (max_x, max_y) = placement_range(candidate.image(), K::plan_width(plan), K::plan_height(plan))?;

    let row_peaks: Vec<Option<Peak>> = (0..=max_y)
        .into_par_iter()
        .map(|y| scan_row::<K>(candidate, plan, y, max_x, params))
        .collect();

    Ok(merge_peaks(row_peaks))
}
