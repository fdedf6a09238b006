use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::{
    app::Intent,
    config::SidebarConfig,
    cropper::CropParams,
    model::AspectRatio,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectChoice {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    R16_9,
    #[serde(rename = "4:3")]
    R4_3,
    #[serde(rename = "2:3")]
    R2_3,
    Free,
}

impl AspectChoice {
    pub const ALL: [AspectChoice; 5] = [
        AspectChoice::Square,
        AspectChoice::R16_9,
        AspectChoice::R4_3,
        AspectChoice::R2_3,
        AspectChoice::Free,
    ];

    pub fn aspect_ratio(&self) -> Option<AspectRatio> {
        match self {
            AspectChoice::Square => Some(AspectRatio::new(1, 1)),
            AspectChoice::R16_9 => Some(AspectRatio::new(16, 9)),
            AspectChoice::R4_3 => Some(AspectRatio::new(4, 3)),
            AspectChoice::R2_3 => Some(AspectRatio::new(2, 3)),
            AspectChoice::Free => None,
        }
    }
}

impl std::fmt::Display for AspectChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AspectChoice::Square => "1:1",
            AspectChoice::R16_9 => "16:9",
            AspectChoice::R4_3 => "4:3",
            AspectChoice::R2_3 => "2:3",
            AspectChoice::Free => "Free",
        };
        write!(f, "{}", s)
    }
}

/// Whether the crop widget hands back the cropped pixels or only the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnType {
    #[default]
    #[serde(rename = "Cropped image")]
    Image,
    #[serde(rename = "Rect coords")]
    Rect,
}

impl ReturnType {
    pub const ALL: [ReturnType; 2] = [ReturnType::Image, ReturnType::Rect];
}

impl std::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReturnType::Image => "Cropped image",
            ReturnType::Rect => "Rect coords",
        };
        write!(f, "{}", s)
    }
}

/// Current state of the sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub realtime_update: bool,
    pub box_color: egui::Color32,
    pub stroke_width: u32,
    pub aspect_choice: AspectChoice,
    pub return_type: ReturnType,
}

impl Controls {
    pub fn from_config(config: &SidebarConfig) -> Self {
        let box_color = config.box_color().unwrap_or_else(|e| {
            log::warn!("{e}, falling back to blue");
            egui::Color32::from_rgb(0, 0, 255)
        });
        Self {
            realtime_update: config.realtime_update,
            box_color,
            stroke_width: config.stroke_width,
            aspect_choice: config.aspect_ratio,
            return_type: config.return_type,
        }
    }

    pub fn crop_params(&self) -> CropParams {
        CropParams {
            realtime_update: self.realtime_update,
            stroke_width: self.stroke_width,
            box_color: self.box_color,
            aspect_ratio: self.aspect_choice.aspect_ratio(),
            return_type: self.return_type,
        }
    }

    /// Draws the sidebar from a copy of the current values and reports every
    /// change as an intent. Nothing is mutated here.
    pub fn sidebar_ui(&self, ui: &mut egui::Ui) -> Vec<Intent> {
        let mut intents = Vec::new();

        if ui.button("Open Image").clicked() {
            intents.push(Intent::PickFile);
        }
        ui.separator();

        let mut realtime_update = self.realtime_update;
        if ui
            .checkbox(&mut realtime_update, "Update in Real Time")
            .changed()
        {
            intents.push(Intent::SetRealtimeUpdate(realtime_update));
        }

        ui.horizontal(|ui| {
            ui.label("Box Color");
            let mut box_color = self.box_color;
            if ui.color_edit_button_srgba(&mut box_color).changed() {
                intents.push(Intent::SetBoxColor(box_color));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Box Thickness");
            let mut stroke_width = self.stroke_width;
            if ui
                .add(
                    egui::DragValue::new(&mut stroke_width)
                        .speed(0.1)
                        .range(1..=100),
                )
                .changed()
            {
                intents.push(Intent::SetStrokeWidth(stroke_width));
            }
        });

        ui.separator();
        ui.label("Aspect Ratio");
        for choice in AspectChoice::ALL {
            if ui
                .radio(self.aspect_choice == choice, choice.to_string())
                .clicked()
                && self.aspect_choice != choice
            {
                intents.push(Intent::SetAspect(choice));
            }
        }

        ui.separator();
        ui.label("Return type");
        for return_type in ReturnType::ALL {
            if ui
                .radio(self.return_type == return_type, return_type.to_string())
                .clicked()
                && self.return_type != return_type
            {
                intents.push(Intent::SetReturnType(return_type));
            }
        }

        intents
    }
}
