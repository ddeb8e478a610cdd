//! Scalar reference kernels for score evaluation.

use crate::kernel::{merge_peaks, placement_range, scan_row, IntegralView, Kernel, Peak, ScanParams};
use crate::template::{MaskedTemplatePlan, TemplatePlan};
use crate::util::FishMatchResult;

/// Scalar masked ZNCC kernel.
pub(crate) struct ZnccMaskedScalar;

/// Scalar unmasked ZNCC kernel.
pub(crate) struct ZnccUnmaskedScalar;

#[inline]
fn finish(dot: f64, sum_i: f64, sum_i2: f64, n: f64, var_t: f64, min_var_i: f64) -> Option<f64> {
    let var_i = sum_i2 - (sum_i * sum_i) / n;
    if var_i / n <= min_var_i {
        return None;
    }
    let score = dot / (var_t * var_i).sqrt();
    score.is_finite().then_some(score)
}

impl Kernel for ZnccMaskedScalar {
    type Plan = MaskedTemplatePlan;

    fn plan_width(plan: &Self::Plan) -> usize {
        plan.width()
    }

    fn plan_height(plan: &Self::Plan) -> usize {
        plan.height()
    }

    fn score_at(
        candidate: &IntegralView<'_>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> Option<f64> {
        let image = candidate.image();
        let tpl_width = tpl.width();
        let tpl_height = tpl.height();
        let (max_x, max_y) = placement_range(image, tpl_width, tpl_height).ok()?;
        if x > max_x || y > max_y {
            return None;
        }

        let t_prime = tpl.t_prime();
        let mask = tpl.mask();

        let mut dot = 0.0f64;
        let mut sum_i = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = &image.row(y + ty)?[x..x + tpl_width];
            let base = ty * tpl_width;
            for (tx, &value) in img_row.iter().enumerate() {
                let idx = base + tx;
                if mask[idx] == 0 {
                    continue;
                }
                let value = value as f64;
                dot += t_prime[idx] * value;
                sum_i += value;
                sum_i2 += value * value;
            }
        }

        finish(
            dot,
            sum_i,
            sum_i2,
            tpl.sum_w() as f64,
            tpl.var_t(),
            params.min_var_i,
        )
    }
}

impl Kernel for ZnccUnmaskedScalar {
    type Plan = TemplatePlan;

    fn plan_width(plan: &Self::Plan) -> usize {
        plan.width()
    }

    fn plan_height(plan: &Self::Plan) -> usize {
        plan.height()
    }

    fn score_at(
        candidate: &IntegralView<'_>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> Option<f64> {
        let image = candidate.image();
        let tpl_width = tpl.width();
        let tpl_height = tpl.height();
        let (max_x, max_y) = placement_range(image, tpl_width, tpl_height).ok()?;
        if x > max_x || y > max_y {
            return None;
        }

        let t_prime = tpl.t_prime();

        let mut dot = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = &image.row(y + ty)?[x..x + tpl_width];
            let tpl_row = &t_prime[ty * tpl_width..(ty + 1) * tpl_width];
            for (&t, &value) in tpl_row.iter().zip(img_row) {
                dot += t * value as f64;
            }
        }
        let (sum_i, sum_i2) = candidate.window_sums(x, y, tpl_width, tpl_height);

        finish(
            dot,
            sum_i as f64,
            sum_i2 as f64,
            tpl.count() as f64,
            tpl.var_t(),
            params.min_var_i,
        )
    }
}

/// Scans every valid placement row by row and returns the best peak.
pub(crate) fn scan_best<K: Kernel>(
    candidate: &IntegralView<'_>,
    plan: &K::Plan,
    params: ScanParams,
) -> FishMatchResult<Option<Peak>> {
    let (max_x, max_y) =
        placement_range(candidate.image(), K::plan_width(plan), K::plan_height(plan))?;
    Ok(merge_peaks(
        (0..=max_y).map(|y| scan_row::<K>(candidate, plan, y, max_x, params)),
    ))
}
