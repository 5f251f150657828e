use crate::PainterApp;
use crate::app::tools::ToolKind;
use crate::brush_engine::brush_options::{
    BRUSH_CAPACITY_RANGE, BRUSH_SIZE_RANGE, SPRAY_DENSITY_RANGE,
};
use crate::shapes::ShapeKind;
use crate::utils::color::color_to_hex;
use crate::utils::exporter::ExportFormat;
use eframe::egui;

/// Top panel with tool, color, size, shape and save controls.
pub fn tool_bar(app: &mut PainterApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("tool_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let options = app.session.engine().options().clone();

            for tool in ToolKind::all() {
                if ui.selectable_label(options.tool == *tool, tool.label()).clicked() {
                    app.session.set_tool(*tool);
                }
            }
            ui.separator();

            let mut color = options.color;
            if egui::color_picker::color_edit_button_srgba(
                ui,
                &mut color,
                egui::color_picker::Alpha::OnlyBlend,
            )
            .changed()
            {
                app.session.set_color(color);
            }

            let mut picked = None;
            for (slot, swatch) in app.session.palette().slots().iter().enumerate() {
                let button = egui::Button::new("")
                    .fill(*swatch)
                    .min_size(egui::vec2(14.0, 14.0));
                if ui.add(button).on_hover_text(color_to_hex(*swatch)).clicked() {
                    picked = Some(slot);
                }
            }
            if let Some(slot) = picked {
                app.session.pick_custom_color(slot);
            }
            if ui.button("+").on_hover_text("Keep current color").clicked() {
                app.session.remember_color();
            }
            ui.separator();

            let mut size = options.brush_size;
            if ui
                .add(egui::Slider::new(&mut size, BRUSH_SIZE_RANGE).text("Size"))
                .changed()
            {
                app.session.set_brush_size(size);
            }

            match options.tool {
                ToolKind::Spray => {
                    let mut density = options.spray_density;
                    if ui
                        .add(egui::Slider::new(&mut density, SPRAY_DENSITY_RANGE).text("Density"))
                        .changed()
                    {
                        app.session.set_spray_density(density);
                    }
                }
                ToolKind::Brush => {
                    let mut capacity = options.brush_capacity;
                    let response = ui.add(
                        egui::DragValue::new(&mut capacity)
                            .range(BRUSH_CAPACITY_RANGE)
                            .prefix("Paint: "),
                    );
                    if response.changed() {
                        app.session.set_brush_capacity(capacity);
                    }
                    if ui.button("Refill").clicked() {
                        app.session.set_brush_capacity(options.brush_capacity);
                    }
                }
                ToolKind::Pen | ToolKind::Eraser => {}
            }
        });

        ui.horizontal(|ui| {
            ui.label("Shapes:");
            for shape in ShapeKind::all() {
                if ui.button(shape.label()).clicked() {
                    app.session.select_shape(*shape);
                }
            }
            if app.session.is_previewing_shape() && ui.button("Cancel").clicked() {
                app.session.cancel_shape();
            }

            ui.separator();
            egui::ComboBox::from_id_salt("save_format")
                .selected_text(app.save_format.label())
                .show_ui(ui, |ui| {
                    for format in ExportFormat::all() {
                        ui.selectable_value(&mut app.save_format, *format, format.label());
                    }
                });
            if ui.button("Save").clicked() {
                // outcome is reported through the session's event queue
                let _ = app.session.request_save(app.save_format.extension());
            }
        });
    });
}
