//! Template plan precomputation for ZNCC scoring.
//!
//! A plan stores the zero-mean template `t' = t - mean(t)` and its energy
//! `var_t = sum(t'^2)`. Scoring a placement then only needs the image window
//! sums: `score = sum(t' * I) / sqrt(var_t * var_i)` with
//! `var_i = sum(I^2) - sum(I)^2 / n`. Masked plans compute every statistic over
//! valid pixels only and store `t' = 0` elsewhere.

use crate::image::ImageView;
use crate::util::{FishMatchError, FishMatchResult};

/// Per-pixel variance at or below this value marks a flat template.
const MIN_TEMPLATE_VARIANCE: f64 = 1e-8;

/// Precomputed statistics for an opaque template.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    var_t: f64,
    t_prime: Vec<f64>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> FishMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(FishMatchError::InvalidDimensions { width, height })?;

        let pixels = collect_pixels(tpl)?;
        let mean = pixels.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
        let t_prime: Vec<f64> = pixels.iter().map(|&v| v as f64 - mean).collect();
        let var_t: f64 = t_prime.iter().map(|v| v * v).sum();
        if var_t / count as f64 <= MIN_TEMPLATE_VARIANCE {
            return Err(FishMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            var_t,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels taking part in the correlation.
    pub fn count(&self) -> usize {
        self.width * self.height
    }

    /// Sum of squared zero-mean template values.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f64] {
        &self.t_prime
    }
}

/// Precomputed statistics for a template with a binary validity mask.
#[derive(Clone, Debug)]
pub struct MaskedTemplatePlan {
    width: usize,
    height: usize,
    sum_w: usize,
    var_t: f64,
    t_prime: Vec<f64>,
    mask: Vec<u8>,
}

impl MaskedTemplatePlan {
    /// Builds a plan from a template view and a mask of the same size.
    ///
    /// Any non-zero mask value marks a valid pixel.
    pub fn from_view(tpl: ImageView<'_, u8>, mask: &[u8]) -> FishMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(FishMatchError::InvalidDimensions { width, height })?;
        if mask.len() != count {
            return Err(FishMatchError::MaskSizeMismatch {
                needed: count,
                got: mask.len(),
            });
        }

        let pixels = collect_pixels(tpl)?;
        let mut sum = 0.0f64;
        let mut sum_w = 0usize;
        for (&value, &m) in pixels.iter().zip(mask) {
            if m != 0 {
                sum += value as f64;
                sum_w += 1;
            }
        }
        if sum_w == 0 {
            return Err(FishMatchError::DegenerateTemplate {
                reason: "mask has no valid pixels",
            });
        }

        let mean = sum / sum_w as f64;
        let mut var_t = 0.0f64;
        let t_prime: Vec<f64> = pixels
            .iter()
            .zip(mask)
            .map(|(&value, &m)| {
                if m == 0 {
                    return 0.0;
                }
                let d = value as f64 - mean;
                var_t += d * d;
                d
            })
            .collect();
        if var_t / sum_w as f64 <= MIN_TEMPLATE_VARIANCE {
            return Err(FishMatchError::DegenerateTemplate {
                reason: "zero variance under mask",
            });
        }

        Ok(Self {
            width,
            height,
            sum_w,
            var_t,
            t_prime,
            mask: mask.to_vec(),
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of valid pixels.
    pub fn sum_w(&self) -> usize {
        self.sum_w
    }

    /// Sum of squared zero-mean values over valid pixels.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Zero-mean template values, zero at invalid pixels.
    pub fn t_prime(&self) -> &[f64] {
        &self.t_prime
    }

    /// Validity mask in row-major order.
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }
}

fn collect_pixels(tpl: ImageView<'_, u8>) -> FishMatchResult<Vec<u8>> {
    let mut pixels = Vec::with_capacity(tpl.width() * tpl.height());
    for y in 0..tpl.height() {
        let row = tpl.row(y).ok_or(FishMatchError::BufferTooSmall {
            needed: (y + 1) * tpl.stride(),
            got: tpl.as_slice().len(),
        })?;
        pixels.extend_from_slice(row);
    }
    Ok(pixels)
}
