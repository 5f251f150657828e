use crate::app::session::PaintSession;
use eframe::egui;

/// Window listing the fixed layer stack; picks the active layer and clears it.
pub fn layers_window(ctx: &egui::Context, session: &mut PaintSession) {
    egui::Window::new("Layers")
        .default_width(180.0)
        .show(ctx, |ui| {
            let active_idx = session.canvas().active_layer_idx();
            let mut picked = None;

            // Iterate in reverse so top layers are at the top of the list
            for (idx, layer) in session.canvas().layers().iter().enumerate().rev() {
                if ui.selectable_label(idx == active_idx, &layer.name).clicked() {
                    picked = Some(idx);
                }
            }

            if let Some(idx) = picked
                && let Err(err) = session.select_active_layer(idx)
            {
                log::warn!("Layer selection failed: {err}");
            }

            ui.separator();
            if ui.button("Clear Layer").clicked() {
                session.clear_active_layer();
            }
        });
}
