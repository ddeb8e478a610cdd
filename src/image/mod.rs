//! Image views, owned grayscale buffers, and frame wrappers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride, which is
//! how a cropped search region is handed to the matcher without copying.

use crate::util::{FishMatchError, FishMatchResult};

mod frame;
pub mod io;

pub use frame::Frame;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> FishMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> FishMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(FishMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> FishMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(FishMatchError::InvalidDimensions { width, height });
        }

        let img_width = self.width;
        let img_height = self.height;
        let out_of_bounds = FishMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width,
            img_height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if x >= img_width || y >= img_height || end_x > img_width || end_y > img_height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(FishMatchError::InvalidDimensions {
                width: img_width,
                height: img_height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(FishMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

/// Owned contiguous grayscale image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> FishMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(FishMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(FishMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(FishMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(FishMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> FishMatchResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = view.row(y).ok_or(FishMatchError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Converts interleaved RGB bytes to grayscale with [`luma_bt601`].
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> FishMatchResult<Self> {
        let count = width
            .checked_mul(height)
            .ok_or(FishMatchError::InvalidDimensions { width, height })?;
        let needed = count * 3;
        if rgb.len() < needed {
            return Err(FishMatchError::BufferTooSmall {
                needed,
                got: rgb.len(),
            });
        }
        let data = rgb[..needed]
            .chunks_exact(3)
            .map(|px| luma_bt601(px[0], px[1], px[2]))
            .collect();
        Self::new(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

/// BT.601 luma in 14-bit fixed point with rounding.
///
/// Same weights and rounding as the common `BGR2GRAY` conversion, so
/// templates and frames decoded here score identically to that pipeline.
#[inline]
pub fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    let acc = r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13);
    (acc >> 14) as u8
}

fn required_len(width: usize, height: usize, stride: usize) -> FishMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(FishMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(FishMatchError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(FishMatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}
