use std::{path::Path, sync::Arc};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::CropperError;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// An image loaded by the user.
///
/// `generation` increases with every load, so widgets can tell two images
/// with identical dimensions apart.
#[derive(Clone)]
pub struct SourceImage {
    image: Arc<DynamicImage>,
    generation: u64,
}

impl SourceImage {
    pub fn new(image: DynamicImage, generation: u64) -> Self {
        Self {
            image: Arc::new(image),
            generation,
        }
    }

    pub fn open(path: &Path, generation: u64) -> Result<Self, CropperError> {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
            });
        if !supported {
            return Err(CropperError::UnsupportedFormat(path.to_path_buf()));
        }

        let image = image::open(path)?;
        Ok(Self::new(image, generation))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Width:height constraint on the crop box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Crop rectangle in image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Shrinks and shifts the box so that it is at least one pixel large and
    /// lies entirely inside a `max_width` x `max_height` image.
    pub fn clamp_to(self, max_width: u32, max_height: u32) -> Self {
        let max_width = max_width.max(1);
        let max_height = max_height.max(1);

        let left = self.left.min(max_width - 1);
        let top = self.top.min(max_height - 1);
        Self {
            left,
            top,
            width: self.width.clamp(1, max_width - left),
            height: self.height.clamp(1, max_height - top),
        }
    }
}

/// What the crop widget hands back on every render.
#[derive(Clone)]
pub enum CropResult {
    Rect(CropBox),
    Image(Arc<DynamicImage>),
}

impl CropResult {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CropResult::Rect(crop) => (crop.width, crop.height),
            CropResult::Image(image) => (image.width(), image.height()),
        }
    }
}
