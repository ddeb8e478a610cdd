//! Borrowed screen frames as handed over by the capture layer.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FishMatchError, FishMatchResult};

/// A captured frame, either already grayscale or interleaved RGB.
///
/// The frame only borrows the caller's buffer for the duration of a detection.
#[derive(Copy, Clone, Debug)]
pub enum Frame<'a> {
    /// Single-channel intensity image.
    Gray(ImageView<'a, u8>),
    /// Tightly packed `RGBRGB...` rows.
    Rgb {
        data: &'a [u8],
        width: usize,
        height: usize,
    },
}

impl<'a> Frame<'a> {
    /// Wraps a grayscale view.
    pub fn gray(view: ImageView<'a, u8>) -> Self {
        Frame::Gray(view)
    }

    /// Wraps interleaved RGB bytes after validating the buffer length.
    pub fn rgb(data: &'a [u8], width: usize, height: usize) -> FishMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(FishMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or(FishMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(FishMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Frame::Rgb {
            data,
            width,
            height,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> usize {
        match self {
            Frame::Gray(view) => view.width(),
            Frame::Rgb { width, .. } => *width,
        }
    }

    /// Frame height in pixels.
    pub fn height(&self) -> usize {
        match self {
            Frame::Gray(view) => view.height(),
            Frame::Rgb { height, .. } => *height,
        }
    }

    /// Returns the grayscale pixels, borrowing when no conversion is needed.
    pub(crate) fn to_gray(&self) -> FishMatchResult<GrayPixels<'a>> {
        match self {
            Frame::Gray(view) => Ok(GrayPixels::Borrowed(*view)),
            Frame::Rgb {
                data,
                width,
                height,
            } => OwnedImage::from_rgb(data, *width, *height).map(GrayPixels::Owned),
        }
    }
}

/// Grayscale pixels of a frame, converted only when the frame was in color.
pub(crate) enum GrayPixels<'a> {
    Borrowed(ImageView<'a, u8>),
    Owned(OwnedImage),
}

impl GrayPixels<'_> {
    pub(crate) fn view(&self) -> ImageView<'_, u8> {
        match self {
            GrayPixels::Borrowed(view) => *view,
            GrayPixels::Owned(img) => img.view(),
        }
    }
}
