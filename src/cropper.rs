use std::sync::Arc;

use eframe::egui;
use image::DynamicImage;

use crate::{
    controls::ReturnType,
    model::{AspectRatio, CropBox, CropResult, SourceImage},
    policy::{self, BoxPolicy},
};

const PADDING: f32 = 20.0;
const HANDLE_TOLERANCE: f32 = 10.0;
const HANDLE_RADIUS: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Center, // Moving
}

/// Visual and behavioral settings for one render of the crop widget.
#[derive(Clone, Debug, PartialEq)]
pub struct CropParams {
    pub realtime_update: bool,
    pub stroke_width: u32,
    pub box_color: egui::Color32,
    pub aspect_ratio: Option<AspectRatio>,
    pub return_type: ReturnType,
}

/// Interactive crop box drawn over an image.
pub trait CropRenderer {
    /// Draws the widget and returns the currently published crop.
    ///
    /// `box_policy` decides the first box after a [`reset`](Self::reset). When
    /// it is `None` the renderer falls back to its own default box.
    fn render_crop(
        &mut self,
        ui: &mut egui::Ui,
        image: &SourceImage,
        params: &CropParams,
        box_policy: Option<BoxPolicy<'_>>,
    ) -> CropResult;

    /// Forgets the current box; the next render draws a fresh one.
    fn reset(&mut self);
}

#[derive(Default)]
pub struct CropWidget {
    texture: Option<(u64, egui::TextureHandle)>,
    crop_rect: Option<egui::Rect>, // Normalized coordinates (0.0-1.0)
    published: CropBox,
    selected_handle: Option<ResizeHandle>,
    locked_ratio: Option<f32>,
    cropped: Option<(CropBox, Arc<DynamicImage>)>,
}

impl CropWidget {
    #[cfg(test)]
    pub(crate) fn published(&self) -> CropBox {
        self.published
    }

    fn load_texture(&mut self, ctx: &egui::Context, image: &SourceImage) -> egui::TextureHandle {
        if let Some((generation, texture)) = &self.texture {
            if *generation == image.generation() {
                return texture.clone();
            }
        }

        let size = [image.width() as _, image.height() as _];
        let image_buffer = image.image().to_rgba8();
        let pixels = image_buffer.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        let texture = ctx.load_texture("crop_source", color_image, egui::TextureOptions::LINEAR);
        self.texture = Some((image.generation(), texture.clone()));
        // A new image always starts from a new box.
        self.reset();
        texture
    }

    fn ensure_initialized(
        &mut self,
        image: &SourceImage,
        params: &CropParams,
        box_policy: Option<BoxPolicy<'_>>,
    ) {
        if self.crop_rect.is_some() {
            return;
        }

        let initial = match box_policy {
            Some(box_policy) => box_policy(image, params.aspect_ratio),
            None => policy::default_box(image, params.aspect_ratio),
        }
        .clamp_to(image.width(), image.height());
        log::debug!("Initial crop box {initial:?}");

        self.crop_rect = Some(to_normalized(initial, image));
        self.published = initial;
    }

    fn result(&mut self, image: &SourceImage, return_type: ReturnType) -> CropResult {
        let crop = self.published;
        match return_type {
            ReturnType::Rect => CropResult::Rect(crop),
            ReturnType::Image => {
                if let Some((cached, cropped)) = &self.cropped {
                    if *cached == crop {
                        return CropResult::Image(cropped.clone());
                    }
                }
                let cropped = Arc::new(
                    image
                        .image()
                        .crop_imm(crop.left, crop.top, crop.width, crop.height),
                );
                self.cropped = Some((crop, cropped.clone()));
                CropResult::Image(cropped)
            }
        }
    }

    fn show(
        &mut self,
        ui: &mut egui::Ui,
        texture: &egui::TextureHandle,
        crop_rect: &mut egui::Rect,
        image: &SourceImage,
        params: &CropParams,
    ) {
        let available_size = ui.available_size();
        let max_size = available_size - egui::vec2(PADDING * 2.0, PADDING * 2.0);
        let image_size = texture.size_vec2();

        // Fit within available space, never upscale
        let scale = (max_size.x / image_size.x)
            .min(max_size.y / image_size.y)
            .clamp(0.01, 1.0);
        let display_size = image_size * scale;

        let total_display_size = display_size + egui::vec2(PADDING * 2.0, PADDING * 2.0);

        // Manual centering
        let x_offset = (available_size.x - total_display_size.x) / 2.0;
        let start_pos = ui.cursor().min + egui::vec2(x_offset.max(0.0), 0.0);

        let target_rect = egui::Rect::from_min_size(start_pos, total_display_size);

        let response = ui.allocate_rect(target_rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(target_rect);

        let image_rect = egui::Rect::from_min_size(
            target_rect.min + egui::vec2(PADDING, PADDING),
            display_size,
        );

        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let mut screen_crop_rect = to_screen(*crop_rect, image_rect);

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.selected_handle = hit_test(pos, screen_crop_rect);
            }
            // Locking keeps whatever proportions the box has right now, even
            // when they differ from the requested ratio.
            self.locked_ratio = params
                .aspect_ratio
                .map(|_| screen_crop_rect.width() / screen_crop_rect.height().max(f32::EPSILON));
        }

        if response.dragged() {
            if let Some(handle) = self.selected_handle {
                drag_crop_rect(
                    crop_rect,
                    handle,
                    response.drag_delta(),
                    self.locked_ratio,
                    display_size,
                );
                screen_crop_rect = to_screen(*crop_rect, image_rect);
            }
        }

        let drag_stopped = response.drag_stopped();
        if drag_stopped {
            self.selected_handle = None;
            self.locked_ratio = None;
        }

        if should_publish(params.realtime_update, drag_stopped, response.double_clicked()) {
            self.published = to_pixels(*crop_rect, image);
            log::debug!("Published crop box {:?}", self.published);
        }

        paint_overlay(&painter, image_rect, screen_crop_rect, params);
    }
}

impl CropRenderer for CropWidget {
    fn render_crop(
        &mut self,
        ui: &mut egui::Ui,
        image: &SourceImage,
        params: &CropParams,
        box_policy: Option<BoxPolicy<'_>>,
    ) -> CropResult {
        let texture = self.load_texture(ui.ctx(), image);
        self.ensure_initialized(image, params, box_policy);

        if let Some(mut crop_rect) = self.crop_rect {
            self.show(ui, &texture, &mut crop_rect, image, params);
            self.crop_rect = Some(crop_rect);
        }

        self.result(image, params.return_type)
    }

    fn reset(&mut self) {
        self.crop_rect = None;
        self.selected_handle = None;
        self.locked_ratio = None;
        self.cropped = None;
    }
}

/// Realtime mode publishes whenever a drag ends; otherwise only a
/// double-click does.
fn should_publish(realtime_update: bool, drag_stopped: bool, double_clicked: bool) -> bool {
    if realtime_update {
        drag_stopped
    } else {
        double_clicked
    }
}

fn to_screen(crop_rect: egui::Rect, image_rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_max(
        image_rect.lerp_inside(crop_rect.min.to_vec2()),
        image_rect.lerp_inside(crop_rect.max.to_vec2()),
    )
}

fn to_normalized(crop: CropBox, image: &SourceImage) -> egui::Rect {
    let w = image.width().max(1) as f32;
    let h = image.height().max(1) as f32;
    egui::Rect::from_min_max(
        egui::pos2(crop.left as f32 / w, crop.top as f32 / h),
        egui::pos2(crop.right() as f32 / w, crop.bottom() as f32 / h),
    )
}

fn to_pixels(crop_rect: egui::Rect, image: &SourceImage) -> CropBox {
    let w = image.width() as f32;
    let h = image.height() as f32;

    let x = (crop_rect.min.x * w).max(0.0).round() as u32;
    let y = (crop_rect.min.y * h).max(0.0).round() as u32;
    let width = (crop_rect.width() * w).max(1.0).round() as u32;
    let height = (crop_rect.height() * h).max(1.0).round() as u32;

    CropBox::new(x, y, width, height).clamp_to(image.width(), image.height())
}

fn hit_test(pos: egui::Pos2, rect: egui::Rect) -> Option<ResizeHandle> {
    let min = rect.min;
    let max = rect.max;

    if pos.distance(min) < HANDLE_TOLERANCE {
        return Some(ResizeHandle::TopLeft);
    }
    if pos.distance(egui::pos2(max.x, min.y)) < HANDLE_TOLERANCE {
        return Some(ResizeHandle::TopRight);
    }
    if pos.distance(egui::pos2(min.x, max.y)) < HANDLE_TOLERANCE {
        return Some(ResizeHandle::BottomLeft);
    }
    if pos.distance(max) < HANDLE_TOLERANCE {
        return Some(ResizeHandle::BottomRight);
    }

    if (pos.x - min.x).abs() < HANDLE_TOLERANCE && pos.y > min.y && pos.y < max.y {
        return Some(ResizeHandle::Left);
    }
    if (pos.x - max.x).abs() < HANDLE_TOLERANCE && pos.y > min.y && pos.y < max.y {
        return Some(ResizeHandle::Right);
    }
    if (pos.y - min.y).abs() < HANDLE_TOLERANCE && pos.x > min.x && pos.x < max.x {
        return Some(ResizeHandle::Top);
    }
    if (pos.y - max.y).abs() < HANDLE_TOLERANCE && pos.x > min.x && pos.x < max.x {
        return Some(ResizeHandle::Bottom);
    }

    if rect.contains(pos) {
        return Some(ResizeHandle::Center);
    }

    None
}

/// Applies one frame of pointer movement to the normalized `crop_rect`.
///
/// `locked_ratio` is a width/height ratio in screen space; when set, resizing
/// is uniform.
fn drag_crop_rect(
    crop_rect: &mut egui::Rect,
    handle: ResizeHandle,
    delta: egui::Vec2,
    locked_ratio: Option<f32>,
    display_size: egui::Vec2,
) {
    let delta_norm = delta / display_size;

    match (handle, locked_ratio) {
        (ResizeHandle::Center, _) => {
            // Safe Panning: constrain delta to stay within bounds
            let mut final_delta = delta_norm;
            if crop_rect.min.x + final_delta.x < 0.0 {
                final_delta.x = -crop_rect.min.x;
            }
            if crop_rect.max.x + final_delta.x > 1.0 {
                final_delta.x = 1.0 - crop_rect.max.x;
            }
            if crop_rect.min.y + final_delta.y < 0.0 {
                final_delta.y = -crop_rect.min.y;
            }
            if crop_rect.max.y + final_delta.y > 1.0 {
                final_delta.y = 1.0 - crop_rect.max.y;
            }

            *crop_rect = crop_rect.translate(final_delta);
            return;
        }
        (
            ResizeHandle::TopLeft
            | ResizeHandle::TopRight
            | ResizeHandle::BottomLeft
            | ResizeHandle::BottomRight,
            Some(ratio),
        ) => {
            // Anchor is the opposite corner
            let (anchor, mut corner) = match handle {
                ResizeHandle::TopLeft => (crop_rect.max, crop_rect.min),
                ResizeHandle::TopRight => (crop_rect.left_bottom(), crop_rect.right_top()),
                ResizeHandle::BottomLeft => (crop_rect.right_top(), crop_rect.left_bottom()),
                _ => (crop_rect.min, crop_rect.max),
            };
            corner += delta_norm;

            let raw_screen = egui::vec2(
                (corner.x - anchor.x).abs() * display_size.x,
                (corner.y - anchor.y).abs() * display_size.y,
            );

            // Project onto the (ratio, 1) direction
            let u = egui::vec2(ratio, 1.0);
            let lambda = raw_screen.dot(u) / u.length_sq();
            let mut final_dim = (u * lambda) / display_size;

            // Shrink uniformly until the box fits between the anchor and the
            // image edges it grows toward
            let room = match handle {
                ResizeHandle::TopLeft => egui::vec2(anchor.x, anchor.y),
                ResizeHandle::TopRight => egui::vec2(1.0 - anchor.x, anchor.y),
                ResizeHandle::BottomLeft => egui::vec2(anchor.x, 1.0 - anchor.y),
                _ => egui::vec2(1.0 - anchor.x, 1.0 - anchor.y),
            };
            final_dim *= fit_scale(final_dim, room);

            *crop_rect = match handle {
                ResizeHandle::TopLeft => egui::Rect::from_min_max(anchor - final_dim, anchor),
                ResizeHandle::TopRight => egui::Rect::from_min_max(
                    egui::pos2(anchor.x, anchor.y - final_dim.y),
                    egui::pos2(anchor.x + final_dim.x, anchor.y),
                ),
                ResizeHandle::BottomLeft => egui::Rect::from_min_max(
                    egui::pos2(anchor.x - final_dim.x, anchor.y),
                    egui::pos2(anchor.x, anchor.y + final_dim.y),
                ),
                _ => egui::Rect::from_min_max(anchor, anchor + final_dim),
            };
        }
        // Side handles drive one dimension and center the other
        (ResizeHandle::Left | ResizeHandle::Right, Some(ratio)) => {
            if handle == ResizeHandle::Left {
                crop_rect.min.x = (crop_rect.min.x + delta_norm.x).clamp(0.0, crop_rect.max.x);
            } else {
                crop_rect.max.x = (crop_rect.max.x + delta_norm.x).clamp(crop_rect.min.x, 1.0);
            }

            let norm_aspect = ratio * display_size.y / display_size.x;
            let mut new_h = crop_rect.width() / norm_aspect;
            if new_h > 1.0 {
                new_h = 1.0;
                let new_w = new_h * norm_aspect;
                if handle == ResizeHandle::Left {
                    crop_rect.min.x = crop_rect.max.x - new_w;
                } else {
                    crop_rect.max.x = crop_rect.min.x + new_w;
                }
            }

            // Keep the center where possible, slide it back inside otherwise
            let center_y = crop_rect
                .center()
                .y
                .clamp(new_h * 0.5, 1.0 - new_h * 0.5);
            crop_rect.min.y = center_y - new_h * 0.5;
            crop_rect.max.y = center_y + new_h * 0.5;
        }
        (ResizeHandle::Top | ResizeHandle::Bottom, Some(ratio)) => {
            if handle == ResizeHandle::Top {
                crop_rect.min.y = (crop_rect.min.y + delta_norm.y).clamp(0.0, crop_rect.max.y);
            } else {
                crop_rect.max.y = (crop_rect.max.y + delta_norm.y).clamp(crop_rect.min.y, 1.0);
            }

            let norm_aspect = ratio * display_size.y / display_size.x;
            let mut new_w = crop_rect.height() * norm_aspect;
            if new_w > 1.0 {
                new_w = 1.0;
                let new_h = new_w / norm_aspect;
                if handle == ResizeHandle::Top {
                    crop_rect.min.y = crop_rect.max.y - new_h;
                } else {
                    crop_rect.max.y = crop_rect.min.y + new_h;
                }
            }

            let center_x = crop_rect
                .center()
                .x
                .clamp(new_w * 0.5, 1.0 - new_w * 0.5);
            crop_rect.min.x = center_x - new_w * 0.5;
            crop_rect.max.x = center_x + new_w * 0.5;
        }
        (ResizeHandle::TopLeft, None) => crop_rect.min += delta_norm,
        (ResizeHandle::TopRight, None) => {
            crop_rect.min.y += delta_norm.y;
            crop_rect.max.x += delta_norm.x;
        }
        (ResizeHandle::BottomLeft, None) => {
            crop_rect.min.x += delta_norm.x;
            crop_rect.max.y += delta_norm.y;
        }
        (ResizeHandle::BottomRight, None) => crop_rect.max += delta_norm,
        (ResizeHandle::Top, None) => crop_rect.min.y += delta_norm.y,
        (ResizeHandle::Bottom, None) => crop_rect.max.y += delta_norm.y,
        (ResizeHandle::Left, None) => crop_rect.min.x += delta_norm.x,
        (ResizeHandle::Right, None) => crop_rect.max.x += delta_norm.x,
    }

    crop_rect.min = crop_rect.min.clamp(egui::Pos2::ZERO, egui::pos2(1.0, 1.0));
    crop_rect.max = crop_rect.max.clamp(egui::Pos2::ZERO, egui::pos2(1.0, 1.0));
    if crop_rect.min.x > crop_rect.max.x {
        std::mem::swap(&mut crop_rect.min.x, &mut crop_rect.max.x);
    }
    if crop_rect.min.y > crop_rect.max.y {
        std::mem::swap(&mut crop_rect.min.y, &mut crop_rect.max.y);
    }
}

/// Largest factor, at most 1, by which `size` can be scaled to fit `room`.
fn fit_scale(size: egui::Vec2, room: egui::Vec2) -> f32 {
    let mut scale: f32 = 1.0;
    if size.x > room.x {
        scale = scale.min(room.x.max(0.0) / size.x);
    }
    if size.y > room.y {
        scale = scale.min(room.y.max(0.0) / size.y);
    }
    scale
}

fn paint_overlay(
    painter: &egui::Painter,
    image_rect: egui::Rect,
    screen_crop_rect: egui::Rect,
    params: &CropParams,
) {
    // Dim the area outside the crop
    let overlay_color = egui::Color32::from_black_alpha(150);
    let dimmed = [
        egui::Rect::from_min_max(
            image_rect.min,
            egui::pos2(image_rect.max.x, screen_crop_rect.min.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, screen_crop_rect.max.y),
            image_rect.max,
        ),
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, screen_crop_rect.min.y),
            egui::pos2(screen_crop_rect.min.x, screen_crop_rect.max.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(screen_crop_rect.max.x, screen_crop_rect.min.y),
            egui::pos2(image_rect.max.x, screen_crop_rect.max.y),
        ),
    ];
    for rect in dimmed {
        painter.rect_filled(rect, 0.0, overlay_color);
    }

    painter.rect_stroke(
        screen_crop_rect,
        0.0,
        egui::Stroke::new(params.stroke_width.max(1) as f32, params.box_color),
    );

    let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    let handle_fill = egui::Color32::WHITE;

    let handles = [
        screen_crop_rect.min,
        screen_crop_rect.max,
        screen_crop_rect.left_bottom(),
        screen_crop_rect.right_top(),
        screen_crop_rect.center_top(),
        screen_crop_rect.center_bottom(),
        screen_crop_rect.left_center(),
        screen_crop_rect.right_center(),
    ];

    for pos in handles {
        painter.circle(pos, HANDLE_RADIUS, handle_fill, handle_stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> SourceImage {
        SourceImage::new(DynamicImage::new_rgb8(width, height), 1)
    }

    fn params(return_type: ReturnType, aspect_ratio: Option<AspectRatio>) -> CropParams {
        CropParams {
            realtime_update: true,
            stroke_width: 3,
            box_color: egui::Color32::from_rgb(0, 0, 255),
            aspect_ratio,
            return_type,
        }
    }

    fn render(
        widget: &mut CropWidget,
        image: &SourceImage,
        params: &CropParams,
        box_policy: Option<BoxPolicy<'_>>,
    ) -> CropResult {
        let ctx = egui::Context::default();
        let mut result = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                result = Some(widget.render_crop(ui, image, params, box_policy));
            });
        });
        result.expect("central panel was not shown")
    }

    fn fixed_policy(_: &SourceImage, _: Option<AspectRatio>) -> CropBox {
        CropBox::new(0, 0, 100, 80)
    }

    #[test]
    fn test_hit_test() {
        let rect = egui::Rect::from_min_max(egui::pos2(100.0, 100.0), egui::pos2(200.0, 180.0));
        assert_eq!(hit_test(egui::pos2(101.0, 99.0), rect), Some(ResizeHandle::TopLeft));
        assert_eq!(hit_test(egui::pos2(199.0, 101.0), rect), Some(ResizeHandle::TopRight));
        assert_eq!(hit_test(egui::pos2(100.0, 180.0), rect), Some(ResizeHandle::BottomLeft));
        assert_eq!(hit_test(egui::pos2(205.0, 185.0), rect), Some(ResizeHandle::BottomRight));
        assert_eq!(hit_test(egui::pos2(102.0, 140.0), rect), Some(ResizeHandle::Left));
        assert_eq!(hit_test(egui::pos2(150.0, 178.0), rect), Some(ResizeHandle::Bottom));
        assert_eq!(hit_test(egui::pos2(150.0, 140.0), rect), Some(ResizeHandle::Center));
        assert_eq!(hit_test(egui::pos2(10.0, 10.0), rect), None);
    }

    #[test]
    fn test_pixel_conversion() {
        let img = image(400, 300);
        let crop = CropBox::new(0, 0, 100, 80);
        assert_eq!(to_pixels(to_normalized(crop, &img), &img), crop);

        let full = egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0));
        assert_eq!(to_pixels(full, &img), CropBox::new(0, 0, 400, 300));
    }

    #[test]
    fn test_free_drag_resizes_one_corner() {
        let display = egui::vec2(400.0, 300.0);
        let mut rect = egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(0.25, 0.25));
        drag_crop_rect(&mut rect, ResizeHandle::BottomRight, egui::vec2(40.0, 0.0), None, display);
        assert_eq!(rect.min, egui::Pos2::ZERO);
        assert!((rect.max.x - 0.35).abs() < 1e-5);
        assert!((rect.max.y - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_locked_drag_keeps_current_proportions() {
        // 100x80 box on a 400x300 image shown at full size, locked while a
        // 1:1 constraint is active.
        let img = image(400, 300);
        let display = egui::vec2(400.0, 300.0);
        let mut rect = to_normalized(CropBox::new(0, 0, 100, 80), &img);

        drag_crop_rect(
            &mut rect,
            ResizeHandle::BottomRight,
            egui::vec2(40.0, 5.0),
            Some(1.25),
            display,
        );

        let crop = to_pixels(rect, &img);
        let ratio = crop.width as f32 / crop.height as f32;
        assert!((ratio - 1.25).abs() < 0.02, "{crop:?}");
        assert!(crop.width > 100);
    }

    #[test]
    fn test_locked_corner_drag_stops_at_image_edge() {
        let img = image(400, 300);
        let display = egui::vec2(400.0, 300.0);
        let mut rect = to_normalized(CropBox::new(0, 0, 300, 240), &img);

        drag_crop_rect(
            &mut rect,
            ResizeHandle::BottomRight,
            egui::vec2(200.0, 10.0),
            Some(1.25),
            display,
        );

        let crop = to_pixels(rect, &img);
        assert_eq!(crop, CropBox::new(0, 0, 375, 300));
    }

    #[test]
    fn test_locked_top_left_drag_stops_at_image_edge() {
        let img = image(400, 300);
        let display = egui::vec2(400.0, 300.0);
        let mut rect = to_normalized(CropBox::new(200, 100, 100, 100), &img);

        drag_crop_rect(
            &mut rect,
            ResizeHandle::TopLeft,
            egui::vec2(-300.0, -300.0),
            Some(1.0),
            display,
        );

        let crop = to_pixels(rect, &img);
        assert_eq!(crop, CropBox::new(100, 0, 200, 200));
    }

    #[test]
    fn test_locked_side_drag_keeps_ratio_near_edge() {
        let img = image(400, 300);
        let display = egui::vec2(400.0, 300.0);
        // 100x80 box touching the bottom edge.
        let mut rect = to_normalized(CropBox::new(100, 220, 100, 80), &img);

        drag_crop_rect(&mut rect, ResizeHandle::Right, egui::vec2(50.0, 0.0), Some(1.25), display);

        let crop = to_pixels(rect, &img);
        assert_eq!((crop.width, crop.height), (150, 120));
        assert_eq!(crop.bottom(), 300);
    }

    #[test]
    fn test_locked_side_drag_caps_at_full_height() {
        let img = image(400, 300);
        let display = egui::vec2(400.0, 300.0);
        let mut rect = to_normalized(CropBox::new(0, 60, 200, 160), &img);

        drag_crop_rect(&mut rect, ResizeHandle::Right, egui::vec2(400.0, 0.0), Some(1.25), display);

        let crop = to_pixels(rect, &img);
        assert_eq!(crop, CropBox::new(0, 0, 375, 300));
    }

    #[test]
    fn test_locked_side_drag_recenters_other_axis() {
        let display = egui::vec2(400.0, 400.0);
        let mut rect = egui::Rect::from_min_max(egui::pos2(0.25, 0.25), egui::pos2(0.75, 0.75));
        drag_crop_rect(&mut rect, ResizeHandle::Right, egui::vec2(-40.0, 0.0), Some(1.0), display);
        assert!((rect.width() - 0.4).abs() < 1e-5);
        assert!((rect.height() - 0.4).abs() < 1e-5);
        assert!((rect.center().y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_pan_stays_inside_image() {
        let display = egui::vec2(400.0, 300.0);
        let mut rect = egui::Rect::from_min_max(egui::pos2(0.5, 0.5), egui::pos2(0.9, 0.9));
        drag_crop_rect(&mut rect, ResizeHandle::Center, egui::vec2(400.0, -600.0), None, display);
        assert!((rect.max.x - 1.0).abs() < 1e-5);
        assert!(rect.min.y.abs() < 1e-5);
        assert!((rect.width() - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_publication_rules() {
        assert!(should_publish(true, true, false));
        assert!(!should_publish(true, false, true));
        assert!(should_publish(false, false, true));
        assert!(!should_publish(false, true, false));
    }

    #[test]
    fn test_image_mode_starts_from_policy_box() {
        let img = image(400, 300);
        let mut widget = CropWidget::default();
        let result = render(
            &mut widget,
            &img,
            &params(ReturnType::Image, Some(AspectRatio::new(1, 1))),
            Some(&fixed_policy),
        );

        // Not reconciled with the 1:1 constraint.
        assert_eq!(widget.published, CropBox::new(0, 0, 100, 80));
        assert_eq!(result.dimensions(), (100, 80));
        assert!(matches!(result, CropResult::Image(_)));
    }

    #[test]
    fn test_rect_mode_starts_from_default_box() {
        let img = image(400, 300);
        let mut widget = CropWidget::default();
        let result = render(&mut widget, &img, &params(ReturnType::Rect, None), None);

        let CropResult::Rect(crop) = result else {
            panic!("expected rectangle result");
        };
        assert_eq!(crop, policy::default_box(&img, None));
        assert!(crop.right() <= 400 && crop.bottom() <= 300);
    }

    #[test]
    fn test_box_survives_renders_until_reset() {
        let img = image(400, 300);
        let mut widget = CropWidget::default();
        let image_params = params(ReturnType::Image, None);
        render(&mut widget, &img, &image_params, Some(&fixed_policy));

        // Without a reset the policy is not consulted again.
        let other = |_: &SourceImage, _: Option<AspectRatio>| CropBox::new(10, 10, 20, 20);
        render(&mut widget, &img, &image_params, Some(&other));
        assert_eq!(widget.published, CropBox::new(0, 0, 100, 80));

        widget.reset();
        render(&mut widget, &img, &image_params, Some(&other));
        assert_eq!(widget.published, CropBox::new(10, 10, 20, 20));
    }

    #[test]
    fn test_new_image_draws_new_box() {
        let mut widget = CropWidget::default();
        let image_params = params(ReturnType::Rect, None);
        render(&mut widget, &image(400, 300), &image_params, Some(&fixed_policy));

        let second = SourceImage::new(DynamicImage::new_rgb8(50, 40), 2);
        render(&mut widget, &second, &image_params, Some(&fixed_policy));
        assert_eq!(widget.published, CropBox::new(0, 0, 50, 40));
    }

    #[test]
    fn test_oversized_policy_box_is_clamped() {
        let img = image(60, 40);
        let mut widget = CropWidget::default();
        let result = render(
            &mut widget,
            &img,
            &params(ReturnType::Image, None),
            Some(&fixed_policy),
        );
        assert_eq!(result.dimensions(), (60, 40));
    }
}
