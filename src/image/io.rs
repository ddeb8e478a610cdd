//! Decoding helpers built on the `image` crate.
//!
//! Color is reduced to grayscale with [`luma_bt601`](crate::image::luma_bt601)
//! rather than the `image` crate's own luma weights.

use crate::image::{Frame, ImageView, OwnedImage};
use crate::util::{FishMatchError, FishMatchResult};
use ::image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

/// Alpha values strictly above this count as valid template pixels.
pub const ALPHA_VALID_THRESHOLD: u8 = 1;

/// Mask value written for valid pixels.
pub const MASK_VALID: u8 = 255;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &GrayImage) -> FishMatchResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned grayscale image from a dynamic image.
pub fn owned_from_dynamic_image(img: &DynamicImage) -> FishMatchResult<OwnedImage> {
    match img {
        DynamicImage::ImageLuma8(gray) => {
            OwnedImage::new(gray.as_raw().clone(), gray.width() as usize, gray.height() as usize)
        }
        other => {
            let rgb = other.to_rgb8();
            OwnedImage::from_rgb(rgb.as_raw(), rgb.width() as usize, rgb.height() as usize)
        }
    }
}

/// Splits a decoded image into grayscale pixels and an optional binary mask.
///
/// A mask is only produced when the image has an alpha channel and at least
/// one pixel is not fully opaque.
pub fn gray_and_mask_from_dynamic(
    img: &DynamicImage,
) -> FishMatchResult<(OwnedImage, Option<Vec<u8>>)> {
    if !img.color().has_alpha() {
        return Ok((owned_from_dynamic_image(img)?, None));
    }

    let rgba = img.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    let mut gray = Vec::with_capacity(width * height);
    let mut mask = Vec::with_capacity(width * height);
    let mut any_transparent = false;
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        gray.push(crate::image::luma_bt601(r, g, b));
        any_transparent |= a != u8::MAX;
        mask.push(if a > ALPHA_VALID_THRESHOLD { MASK_VALID } else { 0 });
    }

    let gray = OwnedImage::new(gray, width, height)?;
    Ok((gray, any_transparent.then_some(mask)))
}

/// Loads an image from disk keeping any alpha channel as a mask.
pub fn load_masked_image<P: AsRef<Path>>(
    path: P,
) -> FishMatchResult<(OwnedImage, Option<Vec<u8>>)> {
    let img = open(path.as_ref())?;
    gray_and_mask_from_dynamic(&img)
}

/// Decoded frame pixels owned by the caller of a detection.
#[derive(Clone, Debug)]
pub enum FrameBuffer {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl FrameBuffer {
    /// Keeps grayscale sources as is and flattens everything else to RGB.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => FrameBuffer::Gray(gray),
            other => FrameBuffer::Rgb(other.to_rgb8()),
        }
    }

    /// Borrows the buffer as a detection frame.
    pub fn frame(&self) -> FishMatchResult<Frame<'_>> {
        match self {
            FrameBuffer::Gray(gray) => view_from_gray_image(gray).map(Frame::gray),
            FrameBuffer::Rgb(rgb) => Frame::rgb(
                rgb.as_raw(),
                rgb.width() as usize,
                rgb.height() as usize,
            ),
        }
    }
}

/// Loads a captured frame from disk.
pub fn load_frame<P: AsRef<Path>>(path: P) -> FishMatchResult<FrameBuffer> {
    open(path.as_ref()).map(FrameBuffer::from_dynamic)
}

fn open(path: &Path) -> FishMatchResult<DynamicImage> {
    ::image::open(path).map_err(|err| FishMatchError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    })
}
