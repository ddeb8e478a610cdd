//! Error types for fishmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for fishmatch operations.
pub type FishMatchResult<T> = std::result::Result<T, FishMatchError>;

/// Errors that can occur while loading assets, reducing regions, or matching.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FishMatchError {
    /// Width or height is zero or the pixel count overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A requested ROI does not fit inside the image.
    #[error(
        "roi {width}x{height} at ({x}, {y}) exceeds image {img_width}x{img_height}"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template statistics are unusable for correlation.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// A template mask does not have the template's dimensions.
    #[error("mask has {got} pixels, template needs {needed}")]
    MaskSizeMismatch { needed: usize, got: usize },
    /// Region fractions are not finite values inside `[0, 1]`.
    #[error("invalid region spec: {0}")]
    InvalidRegionSpec(&'static str),
    /// The reduced region starts outside the frame.
    #[error("region origin ({x}, {y}) lies outside frame {frame_width}x{frame_height}")]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        frame_width: usize,
        frame_height: usize,
    },
    /// The reduced region has zero width or height after clamping.
    #[error("region at ({x}, {y}) is empty")]
    EmptyRegion { x: usize, y: usize },
    /// An image file could not be opened or decoded.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// A required directory does not exist.
    #[error("directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },
}
