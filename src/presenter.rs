use std::sync::Arc;

use eframe::egui;
use image::DynamicImage;
use serde_json::{Map, Value};

use crate::{
    config::PreviewConfig,
    model::{CropBox, CropResult},
};

pub const UPLOAD_PROMPT: &str = "Please upload an image to begin.";
pub const DIMENSIONS_UPDATED: &str = "Crop dimensions updated!";

pub fn original_dimensions(width: u32, height: u32) -> String {
    format!("Original Image Dimensions: {width}px x {height}px")
}

pub fn actual_dimensions(width: u64, height: u64) -> String {
    format!("Actual Crop Dimensions: {width}px x {height}px")
}

/// The crop box as the `{left, top, width, height}` map shown to the user.
pub fn coordinates(crop: &CropBox) -> Map<String, Value> {
    match serde_json::to_value(crop) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Width and height read back from a coordinate map. Missing or non-numeric
/// entries count as 0.
pub fn coordinate_dimensions(coordinates: &Map<String, Value>) -> (u64, u64) {
    let read = |key: &str| coordinates.get(key).and_then(Value::as_u64).unwrap_or(0);
    (read("width"), read("height"))
}

pub fn coordinates_text(crop: &CropBox) -> String {
    serde_json::to_string(crop).unwrap_or_default()
}

/// Size of a thumbnail that fits `max_width` x `max_height`, keeps the aspect
/// ratio and is never larger than the source.
pub fn preview_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width).min(max_width), scaled(height).min(max_height))
}

/// Shows crop results, holding on to the preview texture between frames.
pub struct Presenter {
    max_width: u32,
    max_height: u32,
    preview: Option<(Arc<DynamicImage>, egui::TextureHandle)>,
}

impl Presenter {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            max_width: config.max_width.max(1),
            max_height: config.max_height.max(1),
            preview: None,
        }
    }

    pub fn show_prompt(&mut self, ui: &mut egui::Ui) {
        self.preview = None;
        ui.label(UPLOAD_PROMPT);
    }

    pub fn show_result(&mut self, ui: &mut egui::Ui, result: &CropResult) {
        match result {
            CropResult::Rect(crop) => {
                self.preview = None;
                let coordinates = coordinates(crop);
                ui.label(format!("Crop Coordinates: {}", coordinates_text(crop)));
                let (width, height) = coordinate_dimensions(&coordinates);
                ui.label(actual_dimensions(width, height));
            }
            CropResult::Image(cropped) => {
                ui.label("Cropped Image Preview");
                let (width, height) = result.dimensions();
                ui.label(actual_dimensions(width as u64, height as u64));
                let texture = self.preview_texture(ui.ctx(), cropped);
                ui.image(egui::load::SizedTexture::from_handle(&texture));
            }
        }
    }

    fn preview_texture(
        &mut self,
        ctx: &egui::Context,
        cropped: &Arc<DynamicImage>,
    ) -> egui::TextureHandle {
        if let Some((source, texture)) = &self.preview {
            if Arc::ptr_eq(source, cropped) {
                return texture.clone();
            }
        }

        let (width, height) = preview_size(
            cropped.width(),
            cropped.height(),
            self.max_width,
            self.max_height,
        );
        let thumbnail = cropped.thumbnail_exact(width, height).to_rgba8();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            thumbnail.as_flat_samples().as_slice(),
        );
        let texture = ctx.load_texture("crop_preview", color_image, egui::TextureOptions::LINEAR);
        self.preview = Some((cropped.clone(), texture.clone()));
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_formats() {
        assert_eq!(
            original_dimensions(400, 300),
            "Original Image Dimensions: 400px x 300px"
        );
        assert_eq!(actual_dimensions(100, 80), "Actual Crop Dimensions: 100px x 80px");
    }

    #[test]
    fn test_coordinates_keep_field_order() {
        assert_eq!(
            coordinates_text(&CropBox::new(1, 2, 3, 4)),
            r#"{"left":1,"top":2,"width":3,"height":4}"#
        );
    }

    #[test]
    fn test_coordinate_dimensions() {
        let map = coordinates(&CropBox::new(10, 20, 30, 40));
        assert_eq!(coordinate_dimensions(&map), (30, 40));
    }

    #[test]
    fn test_missing_coordinates_default_to_zero() {
        let mut map = coordinates(&CropBox::new(10, 20, 30, 40));
        map.remove("height");
        assert_eq!(coordinate_dimensions(&map), (30, 0));
        assert_eq!(coordinate_dimensions(&Map::new()), (0, 0));
    }

    #[test]
    fn test_preview_size() {
        assert_eq!(preview_size(100, 80, 150, 150), (100, 80));
        assert_eq!(preview_size(300, 150, 150, 150), (150, 75));
        assert_eq!(preview_size(200, 400, 150, 150), (75, 150));
        assert_eq!(preview_size(150, 150, 150, 150), (150, 150));
        assert_eq!(preview_size(3000, 2, 150, 150), (150, 1));
    }

    #[test]
    fn test_preview_texture_is_cached() {
        let mut presenter = Presenter::new(&PreviewConfig::default());
        let cropped = Arc::new(DynamicImage::new_rgb8(300, 150));
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let first = presenter.preview_texture(ctx, &cropped);
            let second = presenter.preview_texture(ctx, &cropped);
            assert_eq!(first.id(), second.id());
            assert_eq!(first.size(), [150, 75]);
        });
    }
}
