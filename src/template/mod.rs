//! Reference icons and their correlation plans.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FishMatchError, FishMatchResult};

mod plan;
mod store;

pub use plan::{MaskedTemplatePlan, TemplatePlan};
pub(crate) use store::image_files;
pub use store::{load_templates, TemplateCollection, TEMPLATE_EXTENSION};

/// One labeled reference icon in grayscale, optionally masked.
///
/// Immutable once built; matching only ever borrows it. The correlation plan
/// is computed on construction and reused by every detection.
#[derive(Clone, Debug)]
pub struct Template {
    label: String,
    img: OwnedImage,
    mask: Option<Vec<u8>>,
    plan: Result<MatchPlan, FishMatchError>,
}

// The plan is derived from the pixels and mask, so it takes no part in equality.
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.img == other.img && self.mask == other.mask
    }
}

impl Eq for Template {}

impl Template {
    /// Creates an opaque template from a contiguous grayscale buffer.
    pub fn new(
        label: impl Into<String>,
        data: Vec<u8>,
        width: usize,
        height: usize,
    ) -> FishMatchResult<Self> {
        Self::from_image(label, OwnedImage::new(data, width, height)?, None)
    }

    /// Creates a template from decoded pixels and an optional validity mask.
    pub fn from_image(
        label: impl Into<String>,
        img: OwnedImage,
        mask: Option<Vec<u8>>,
    ) -> FishMatchResult<Self> {
        if let Some(mask) = &mask {
            let needed = img.width() * img.height();
            if mask.len() != needed {
                return Err(FishMatchError::MaskSizeMismatch {
                    needed,
                    got: mask.len(),
                });
            }
        }
        let plan = match &mask {
            Some(mask) => MaskedTemplatePlan::from_view(img.view(), mask).map(MatchPlan::Masked),
            None => TemplatePlan::from_view(img.view()).map(MatchPlan::Unmasked),
        };
        Ok(Self {
            label: label.into(),
            img,
            mask,
            plan,
        })
    }

    /// Creates a masked template; non-zero mask entries are valid pixels.
    pub fn with_mask(
        label: impl Into<String>,
        data: Vec<u8>,
        mask: Vec<u8>,
        width: usize,
        height: usize,
    ) -> FishMatchResult<Self> {
        Self::from_image(label, OwnedImage::new(data, width, height)?, Some(mask))
    }

    /// Returns the label the template reports on a match.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the validity mask, if the source had transparency.
    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    /// Returns the precomputed correlation statistics for this template.
    ///
    /// Fails with [`FishMatchError::DegenerateTemplate`] when the (masked)
    /// template has no intensity variation to correlate against.
    pub fn plan(&self) -> FishMatchResult<&MatchPlan> {
        self.plan.as_ref().map_err(Clone::clone)
    }
}

/// Correlation plan for either template flavor.
#[derive(Clone, Debug)]
pub enum MatchPlan {
    Unmasked(TemplatePlan),
    Masked(MaskedTemplatePlan),
}

impl MatchPlan {
    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        match self {
            MatchPlan::Unmasked(plan) => plan.width(),
            MatchPlan::Masked(plan) => plan.width(),
        }
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        match self {
            MatchPlan::Unmasked(plan) => plan.height(),
            MatchPlan::Masked(plan) => plan.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchPlan, Template};
    use crate::util::FishMatchError;

    #[test]
    fn mask_dimensions_are_enforced() {
        let err = Template::with_mask("cod", vec![0; 6], vec![255; 4], 3, 2).unwrap_err();
        assert_eq!(err, FishMatchError::MaskSizeMismatch { needed: 6, got: 4 });
    }

    #[test]
    fn plan_flavor_follows_mask() {
        let data: Vec<u8> = (0..9).map(|v| v * 20).collect();
        let opaque = Template::new("a", data.clone(), 3, 3).unwrap();
        assert!(matches!(opaque.plan().unwrap(), MatchPlan::Unmasked(_)));

        let masked = Template::with_mask("b", data, vec![255; 9], 3, 3).unwrap();
        assert!(matches!(masked.plan().unwrap(), MatchPlan::Masked(_)));
    }

    #[test]
    fn plan_is_built_once_and_shared() {
        let data: Vec<u8> = (0..12).map(|v| v * 9).collect();
        let tpl = Template::new("roach", data, 4, 3).unwrap();
        let first = tpl.plan().unwrap() as *const MatchPlan;
        let second = tpl.plan().unwrap() as *const MatchPlan;
        assert_eq!(first, second);

        let copy = tpl.clone();
        assert_eq!(copy, tpl);
        assert_eq!(copy.plan().unwrap().width(), 4);
    }

    #[test]
    fn degenerate_plan_still_builds_template() {
        let flat = Template::new("flat", vec![3; 6], 3, 2).unwrap();
        assert_eq!(
            flat.plan().unwrap_err(),
            FishMatchError::DegenerateTemplate {
                reason: "zero variance"
            }
        );
    }
}
