use std::path::PathBuf;

use eframe::egui;

use crate::{
    config::AppConfig,
    controls::{AspectChoice, Controls, ReturnType},
    cropper::{CropRenderer, CropWidget},
    model::{AspectRatio, SourceImage, SUPPORTED_EXTENSIONS},
    policy,
    presenter::{self, Presenter},
    session::{Refresh, Session},
};

/// Height kept free below the crop widget for the result report.
const RESULT_AREA_HEIGHT: f32 = 260.0;

/// A discrete user action. Every control change becomes one of these and is
/// applied before the next render pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    PickFile,
    LoadFile(PathBuf),
    SetRealtimeUpdate(bool),
    SetBoxColor(egui::Color32),
    SetStrokeWidth(u32),
    SetAspect(AspectChoice),
    SetReturnType(ReturnType),
    ConfirmDimensions { width: u32, height: u32 },
}

/// Values typed into the crop dimension inputs but not yet confirmed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DimensionInputs {
    width: u32,
    height: u32,
}

pub struct CropperApp<R = CropWidget> {
    controls: Controls,
    session: Session,
    image: Option<SourceImage>,
    next_generation: u64,
    inputs: DimensionInputs,
    renderer: R,
    presenter: Presenter,
    dimensions_updated: bool,
    status: Option<String>,
}

impl CropperApp<CropWidget> {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self::with_renderer(config, CropWidget::default())
    }
}

impl<R: CropRenderer> CropperApp<R> {
    pub fn with_renderer(config: AppConfig, renderer: R) -> Self {
        Self {
            controls: Controls::from_config(&config.sidebar),
            session: Session::default(),
            image: None,
            next_generation: 1,
            inputs: DimensionInputs::default(),
            renderer,
            presenter: Presenter::new(&config.preview),
            dimensions_updated: false,
            status: None,
        }
    }

    pub fn load_image(&mut self, image: image::DynamicImage) {
        self.install_image(SourceImage::new(image, self.next_generation));
    }

    fn install_image(&mut self, image: SourceImage) {
        self.next_generation = image.generation() + 1;
        log::info!("Loaded image {}x{}", image.width(), image.height());

        self.session.fit_to(&image);
        let (width, height) = self.session.get_or_init(&image);
        self.inputs = DimensionInputs { width, height };
        self.image = Some(image);
        self.renderer.reset();
        self.dimensions_updated = false;
        self.status = None;
    }

    pub fn dispatch(&mut self, ctx: &egui::Context, intent: Intent) {
        log::debug!("Dispatching {intent:?}");
        // The confirmation notice only lasts until the next action
        self.dimensions_updated = false;
        match intent {
            Intent::PickFile => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", SUPPORTED_EXTENSIONS)
                    .pick_file()
                {
                    self.dispatch(ctx, Intent::LoadFile(path));
                }
            }
            Intent::LoadFile(path) => match SourceImage::open(&path, self.next_generation) {
                Ok(image) => self.install_image(image),
                Err(e) => {
                    log::error!("Failed to open {}: {e}", path.display());
                    self.status = Some(e.to_string());
                }
            },
            // Styling only, the current box stays
            Intent::SetRealtimeUpdate(realtime_update) => {
                self.controls.realtime_update = realtime_update;
            }
            Intent::SetBoxColor(box_color) => self.controls.box_color = box_color,
            Intent::SetStrokeWidth(stroke_width) => self.controls.stroke_width = stroke_width,
            Intent::SetAspect(aspect_choice) => {
                self.controls.aspect_choice = aspect_choice;
                self.renderer.reset();
            }
            Intent::SetReturnType(return_type) => {
                self.controls.return_type = return_type;
                self.renderer.reset();
            }
            Intent::ConfirmDimensions { width, height } => {
                let refresh = self.session.confirm(width, height);
                self.apply_refresh(ctx, refresh);
                self.dimensions_updated = true;
            }
        }
    }

    fn apply_refresh(&mut self, ctx: &egui::Context, _refresh: Refresh) {
        self.renderer.reset();
        ctx.request_repaint();
    }

    /// One full pass: collect intents from dropped files and the sidebar,
    /// apply them, then draw the main area.
    pub fn frame(&mut self, ctx: &egui::Context) {
        let mut intents: Vec<Intent> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .take(1)
                .map(Intent::LoadFile)
                .collect()
        });

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .show(ctx, |ui| {
                intents.extend(self.controls.sidebar_ui(ui));
            });

        for intent in intents.drain(..) {
            self.dispatch(ctx, intent);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Cropper Demo with Custom Crop Dimensions and Actual Crop Size");
            if let Some(status) = &self.status {
                ui.colored_label(ui.visuals().error_fg_color, status);
            }
            intents.extend(self.main_area(ui));
        });

        for intent in intents {
            self.dispatch(ctx, intent);
        }
    }

    fn main_area(&mut self, ui: &mut egui::Ui) -> Vec<Intent> {
        let mut intents = Vec::new();

        let Some(image) = self.image.clone() else {
            self.presenter.show_prompt(ui);
            return intents;
        };

        ui.label(presenter::original_dimensions(image.width(), image.height()));

        ui.add_space(8.0);
        ui.heading("Insert Crop Dimensions");
        ui.horizontal(|ui| {
            ui.label("Crop Width (px)");
            ui.add(egui::DragValue::new(&mut self.inputs.width).range(1..=image.width()));
            ui.label(" x ");
            ui.label("Crop Height (px)");
            ui.add(egui::DragValue::new(&mut self.inputs.height).range(1..=image.height()));
        });
        if ui.button("Apply Crop Dimensions").clicked() {
            intents.push(Intent::ConfirmDimensions {
                width: self.inputs.width,
                height: self.inputs.height,
            });
        }
        if self.dimensions_updated {
            ui.colored_label(egui::Color32::from_rgb(0, 160, 60), presenter::DIMENSIONS_UPDATED);
        }

        ui.add_space(8.0);
        ui.heading("Crop the Image");

        let params = self.controls.crop_params();
        let session = &self.session;
        let box_policy = |image: &SourceImage, aspect: Option<AspectRatio>| {
            policy::initial_box(session, image, aspect)
        };
        // Only the image result starts from the custom box.
        let box_policy: Option<policy::BoxPolicy<'_>> = match params.return_type {
            ReturnType::Image => Some(&box_policy),
            ReturnType::Rect => None,
        };

        let crop_area = egui::vec2(
            ui.available_width(),
            (ui.available_height() - RESULT_AREA_HEIGHT).max(200.0),
        );
        let renderer = &mut self.renderer;
        let result = ui
            .allocate_ui(crop_area, |ui| {
                renderer.render_crop(ui, &image, &params, box_policy)
            })
            .inner;

        self.presenter.show_result(ui, &result);

        intents
    }
}

impl<R: CropRenderer> eframe::App for CropperApp<R> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }
}
