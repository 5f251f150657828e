use rusty_sketchpad::{PainterApp, Settings};

/// Launch the native egui application.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("{err:#}; continuing with default settings");
            Settings::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([
            settings.canvas.width as f32 + 40.0,
            settings.canvas.height as f32 + 120.0,
        ]),
        ..Default::default()
    };
    eframe::run_native(
        "Rusty Sketchpad",
        options,
        Box::new(|cc| Ok(Box::new(PainterApp::new(cc, settings)))),
    )
}
