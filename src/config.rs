use std::path::PathBuf;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::{
    controls::{AspectChoice, ReturnType},
    error::CropperError,
};

const APP_DIR: &str = "crop-dimensions-demo";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sidebar: SidebarConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

/// Starting values of the sidebar controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarConfig {
    #[serde(default = "default_true")]
    pub realtime_update: bool,
    #[serde(default = "default_box_color")]
    pub box_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default)]
    pub aspect_ratio: AspectChoice,
    #[serde(default)]
    pub return_type: ReturnType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_side")]
    pub max_width: u32,
    #[serde(default = "default_preview_side")]
    pub max_height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

fn default_true() -> bool {
    true
}

fn default_box_color() -> String {
    "#0000FF".to_string()
}

fn default_stroke_width() -> u32 {
    3
}

fn default_preview_side() -> u32 {
    150
}

fn default_window_width() -> f32 {
    1100.0
}

fn default_window_height() -> f32 {
    800.0
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            realtime_update: true,
            box_color: default_box_color(),
            stroke_width: default_stroke_width(),
            aspect_ratio: AspectChoice::default(),
            return_type: ReturnType::default(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_preview_side(),
            max_height: default_preview_side(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl SidebarConfig {
    pub fn box_color(&self) -> Result<Color32, CropperError> {
        parse_color(&self.box_color)
    }
}

pub fn parse_color(hex: &str) -> Result<Color32, CropperError> {
    Color32::from_hex(hex.trim()).map_err(|_| CropperError::InvalidColor(hex.to_string()))
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<AppConfig, CropperError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from file, or return default if file doesn't exist
pub fn load_config() -> AppConfig {
    let Some(path) = config_path() else {
        log::debug!("No config directory available, using defaults");
        return AppConfig::default();
    };
    if !path.exists() {
        return AppConfig::default();
    }

    match std::fs::read_to_string(&path)
        .map_err(CropperError::from)
        .and_then(|content| parse_config(&content))
    {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Failed to load config file {}: {e}. Using defaults.", path.display());
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.sidebar.realtime_update);
        assert_eq!(config.sidebar.box_color, "#0000FF");
        assert_eq!(config.sidebar.stroke_width, 3);
        assert_eq!(config.sidebar.aspect_ratio, AspectChoice::Square);
        assert_eq!(config.sidebar.return_type, ReturnType::Image);
        assert_eq!((config.preview.max_width, config.preview.max_height), (150, 150));
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r##"
            [sidebar]
            realtime_update = false
            aspect_ratio = "16:9"
            return_type = "Rect coords"

            [preview]
            max_width = 200
            "##,
        )
        .unwrap();

        assert!(!config.sidebar.realtime_update);
        assert_eq!(config.sidebar.stroke_width, 3);
        assert_eq!(config.sidebar.aspect_ratio, AspectChoice::R16_9);
        assert_eq!(config.sidebar.return_type, ReturnType::Rect);
        assert_eq!(config.preview.max_width, 200);
        assert_eq!(config.preview.max_height, 150);
    }

    #[test]
    fn test_unknown_aspect_is_an_error() {
        let result = parse_config("[sidebar]\naspect_ratio = \"5:4\"\n");
        assert!(matches!(result, Err(CropperError::Toml(_))));
    }

    #[test]
    fn test_box_color() {
        let sidebar = SidebarConfig::default();
        assert_eq!(sidebar.box_color().unwrap(), Color32::from_rgb(0, 0, 255));

        assert_eq!(parse_color("#ff8000").unwrap(), Color32::from_rgb(255, 128, 0));
        assert!(matches!(parse_color("blue"), Err(CropperError::InvalidColor(_))));
        assert!(matches!(parse_color("0000FF"), Err(CropperError::InvalidColor(_))));
    }
}
