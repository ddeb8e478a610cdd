//! FishMatch identifies which icon from a fixed template set appears in a
//! captured game screen.
//!
//! Templates are matched with masked zero-mean normalized cross-correlation
//! (ZNCC), optionally inside a resolution-dependent crop of the frame. The
//! [`harness`] module measures how accurate and how fast the crop is compared
//! with a full-frame search. Placement scanning and the two benchmark passes
//! can run in parallel via the `rayon` feature.

pub mod detect;
pub mod harness;
pub mod image;
mod kernel;
pub mod region;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use crate::image::io::{load_frame, FrameBuffer};
pub use crate::image::{Frame, ImageView, OwnedImage};
pub use detect::{detect, DetectionOutcome, Detector};
pub use harness::{Benchmark, BenchmarkConfig, BenchmarkReport, DetectionResult};
pub use kernel::{Peak, ScanParams};
pub use region::{reduce, PixelRect, RegionSpec, ResolutionProfile};
pub use search::{
    best_match, evaluate, BestMatch, MatchConfig, SkipReason, TemplateEvaluation, TemplateScore,
};
pub use template::{load_templates, MaskedTemplatePlan, Template, TemplateCollection, TemplatePlan};
pub use util::{FishMatchError, FishMatchResult};
