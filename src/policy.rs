//! Initial crop box computation.
//!
//! The widget draws its first box either from a caller supplied policy or,
//! when none is given, from [`default_box`].

use crate::{
    model::{AspectRatio, CropBox, SourceImage},
    session::Session,
};

/// Computes the box drawn before the user drags anything.
pub type BoxPolicy<'a> = &'a dyn Fn(&SourceImage, Option<AspectRatio>) -> CropBox;

/// Fraction of each image side covered by the default box.
const DEFAULT_BOX_FRACTION: f32 = 0.6;

/// Top-left anchored box of the session's desired dimensions.
///
/// The aspect ratio is not applied here: a 100x80 box stays 100x80 under a
/// 1:1 constraint.
pub fn initial_box(
    session: &Session,
    image: &SourceImage,
    _aspect_ratio: Option<AspectRatio>,
) -> CropBox {
    let (width, height) = session.dimensions_for(image);
    CropBox::new(0, 0, width, height)
}

/// The widget's own recommended box: centered, covering 60% of each side, or
/// the largest box of the requested ratio inside that area.
pub fn default_box(image: &SourceImage, aspect_ratio: Option<AspectRatio>) -> CropBox {
    let image_w = image.width() as f32;
    let image_h = image.height() as f32;
    let area_w = image_w * DEFAULT_BOX_FRACTION;
    let area_h = image_h * DEFAULT_BOX_FRACTION;

    let (box_w, box_h) = match aspect_ratio {
        None => (area_w, area_h),
        Some(aspect) => {
            let ratio = aspect.ratio();
            if area_w / area_h > ratio {
                (area_h * ratio, area_h)
            } else {
                (area_w, area_w / ratio)
            }
        }
    };

    CropBox::new(
        ((image_w - box_w) / 2.0).max(0.0) as u32,
        ((image_h - box_h) / 2.0).max(0.0) as u32,
        box_w.round().max(1.0) as u32,
        box_h.round().max(1.0) as u32,
    )
    .clamp_to(image.width(), image.height())
}
