#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;
mod config;
mod controls;
mod cropper;
mod error;
mod model;
mod policy;
mod presenter;
mod session;

use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = config::load_config();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height]),
        ..Default::default()
    };

    eframe::run_native(
        "Crop Dimensions Demo",
        options,
        Box::new(|cc| Ok(Box::new(app::CropperApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run the cropper window: {e}"))
}
