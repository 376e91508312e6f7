//! NESTICLE - desktop front-end for the nes_py emulation engine

use eframe::egui;

use nesticle::app::{NesticleApp, WINDOW_SIZE, WINDOW_TITLE};
use nesticle::nes_py::NesPyLoader;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let viewport = egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size(WINDOW_SIZE)
        .with_resizable(false);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|cc| Ok(Box::new(NesticleApp::new(&cc.egui_ctx, NesPyLoader)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run application: {}", e))
}
