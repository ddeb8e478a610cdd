//! Resolution profiles and the fractional crop that bounds the icon search.
//!
//! The result icon renders at a fixed relative position on screen, so each
//! resolution profile carries a [`RegionSpec`]: four fractions of the frame
//! size. [`reduce`] turns those fractions into a pixel rectangle that is
//! guaranteed to lie inside the frame.

use crate::util::math::floor_fraction;
use crate::util::{FishMatchError, FishMatchResult};
use std::path::{Path, PathBuf};

/// Crop rectangle as fractions of the frame width and height.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegionSpec {
    x_start: f64,
    y_start: f64,
    width: f64,
    height: f64,
}

impl RegionSpec {
    /// Region where the catch result appears on a 16:9 game window.
    pub const FISH_RESULT: RegionSpec = RegionSpec {
        x_start: 0.20,
        y_start: 0.65,
        width: 0.30,
        height: 0.35,
    };

    /// Creates a region after checking that every fraction is in `[0, 1]`.
    pub fn new(x_start: f64, y_start: f64, width: f64, height: f64) -> FishMatchResult<Self> {
        for value in [x_start, y_start, width, height] {
            if !value.is_finite() {
                return Err(FishMatchError::InvalidRegionSpec("fractions must be finite"));
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(FishMatchError::InvalidRegionSpec(
                    "fractions must lie in [0, 1]",
                ));
            }
        }
        Ok(Self {
            x_start,
            y_start,
            width,
            height,
        })
    }

    /// Left edge as a fraction of the frame width.
    pub fn x_start(&self) -> f64 {
        self.x_start
    }

    /// Top edge as a fraction of the frame height.
    pub fn y_start(&self) -> f64 {
        self.y_start
    }

    /// Width as a fraction of the frame width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height as a fraction of the frame height.
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Default for RegionSpec {
    fn default() -> Self {
        Self::FISH_RESULT
    }
}

/// Rectangle in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Converts `spec` into a pixel rectangle clamped to the frame.
///
/// Every coordinate is floored. Width and height are clamped so the rectangle
/// never extends past the frame. Fails with
/// [`FishMatchError::RegionOutOfBounds`] when the origin lies outside the frame
/// and [`FishMatchError::EmptyRegion`] when nothing is left after clamping.
pub fn reduce(
    frame_width: usize,
    frame_height: usize,
    spec: &RegionSpec,
) -> FishMatchResult<PixelRect> {
    let x = floor_fraction(frame_width, spec.x_start);
    let y = floor_fraction(frame_height, spec.y_start);
    if x >= frame_width || y >= frame_height {
        return Err(FishMatchError::RegionOutOfBounds {
            x,
            y,
            frame_width,
            frame_height,
        });
    }

    let width = floor_fraction(frame_width, spec.width).min(frame_width - x);
    let height = floor_fraction(frame_height, spec.height).min(frame_height - y);
    if width == 0 || height == 0 {
        return Err(FishMatchError::EmptyRegion { x, y });
    }

    Ok(PixelRect {
        x,
        y,
        width,
        height,
    })
}

/// Named frame-size class with its crop region.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolutionProfile {
    name: String,
    region: RegionSpec,
}

impl ResolutionProfile {
    /// Profile name of the reference capture resolution.
    pub const DEFAULT_NAME: &'static str = "1920x1080";

    /// Creates a profile.
    pub fn new(name: impl Into<String>, region: RegionSpec) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }

    /// Profile name, conventionally `{width}x{height}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Crop region used when region reduction is enabled.
    pub fn region(&self) -> &RegionSpec {
        &self.region
    }

    /// Conventional template directory: `{root}/images/{name}/fish`.
    pub fn template_dir(&self, root: &Path) -> PathBuf {
        root.join("images").join(&self.name).join("fish")
    }

    /// Conventional labeled corpus directory: `{root}/tests/assets/{name}`.
    pub fn corpus_dir(&self, root: &Path) -> PathBuf {
        root.join("tests").join("assets").join(&self.name)
    }
}

impl Default for ResolutionProfile {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME, RegionSpec::FISH_RESULT)
    }
}
