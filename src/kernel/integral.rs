//! Summed-area tables over a candidate image.
//!
//! Window sums of `I` and `I^2` come from four table lookups, so the unmasked
//! kernel only has to accumulate the template dot product per placement.
//! Sums are exact integers, identical to accumulating the pixels directly.

use crate::ImageView;

/// Candidate image together with its integral tables.
pub(crate) struct IntegralView<'a> {
    image: ImageView<'a, u8>,
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl<'a> IntegralView<'a> {
    /// Builds the sum and squared-sum tables for `image`.
    pub(crate) fn new(image: ImageView<'a, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sum_sq = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let Some(row) = image.row(y) else {
                break;
            };
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let value = value as u64;
                row_sum += value;
                row_sq += value * value;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self {
            image,
            stride,
            sum,
            sum_sq,
        }
    }

    /// Returns the underlying image.
    pub(crate) fn image(&self) -> ImageView<'a, u8> {
        self.image
    }

    /// Sum and sum of squares over the `width` x `height` window at `(x, y)`.
    ///
    /// The window must lie inside the image.
    pub(crate) fn window_sums(&self, x: usize, y: usize, width: usize, height: usize) -> (u64, u64) {
        let top_left = y * self.stride + x;
        let top_right = top_left + width;
        let bottom_left = (y + height) * self.stride + x;
        let bottom_right = bottom_left + width;
        let rect = |table: &[u64]| {
            table[bottom_right] + table[top_left] - table[top_right] - table[bottom_left]
        };
        (rect(&self.sum), rect(&self.sum_sq))
    }
}
