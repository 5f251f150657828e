use super::input_handler;
use super::session::PaintSession;
use super::state::SessionEvent;
use crate::{
    canvas::surface::PixelSurface,
    config::Settings,
    ui,
    utils::{exporter::ExportFormat, profiler::ScopeTimer, vector::Vec2},
};
use eframe::egui;
use eframe::egui::{Color32, TextureHandle, TextureOptions};
use std::time::Duration;

/// egui application that owns the paint session and its display texture.
pub struct PainterApp {
    pub(crate) session: PaintSession,
    pub(crate) display: PixelSurface,
    pub(crate) texture: TextureHandle,

    pub(crate) zoom: f32,
    pub(crate) offset: Vec2,
    pub(crate) first_frame: bool,
    pub(crate) is_panning: bool,
    pub(crate) is_primary_down: bool,

    pub(crate) save_format: ExportFormat,
    pub(crate) status: Option<String>,
}

impl PainterApp {
    /// Build the session from `settings` and allocate the canvas texture.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let session = PaintSession::new(&settings);
        let display = session.composite();
        let texture = cc.egui_ctx.load_texture(
            "canvas",
            Self::color_image(&display),
            TextureOptions::NEAREST,
        );

        Self {
            session,
            display,
            texture,
            zoom: 1.0,
            offset: Vec2::new(0.0, 0.0),
            first_frame: true,
            is_panning: false,
            is_primary_down: false,
            save_format: ExportFormat::from_token(&settings.export.default_format),
            status: None,
        }
    }

    fn color_image(surface: &PixelSurface) -> egui::ColorImage {
        let mut img =
            egui::ColorImage::new([surface.width(), surface.height()], Color32::TRANSPARENT);
        img.pixels.copy_from_slice(surface.pixels());
        img
    }

    /// Re-render the session into the display surface and upload it.
    fn sync_texture(&mut self) {
        if !self.session.take_dirty() {
            return;
        }
        let _timer = ScopeTimer::new("texture_set");
        self.session.render(&mut self.display);
        self.texture
            .set(Self::color_image(&self.display), TextureOptions::NEAREST);
    }

    /// Turn queued session events into a status line.
    fn drain_events(&mut self) {
        for event in self.session.take_events() {
            self.status = Some(match event {
                SessionEvent::BrushDepleted => {
                    "Brush is out of paint. Pick the brush again to refill it.".to_string()
                }
                SessionEvent::Saved(path) => format!("Saved {}", path.display()),
                SessionEvent::SaveFailed(reason) => format!("Save failed: {reason}"),
            });
        }
    }

    /// Convert a screen-space position into canvas space under the current zoom.
    pub(crate) fn screen_to_canvas(&self, pos: egui::Pos2, origin: egui::Pos2) -> (Vec2, bool) {
        let canvas_point = (pos - origin) / self.zoom;
        let (w, h) = (
            self.session.canvas().width() as f32,
            self.session.canvas().height() as f32,
        );
        let clamped = Vec2::new(canvas_point.x.clamp(0.0, w), canvas_point.y.clamp(0.0, h));
        let is_inside = canvas_point.x >= 0.0
            && canvas_point.y >= 0.0
            && canvas_point.x <= w
            && canvas_point.y <= h;
        (clamped, is_inside)
    }
}

impl eframe::App for PainterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::tool_bar::tool_bar(self, ctx);
        ui::layers::layers_window(ctx, &mut self.session);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let engine = self.session.engine();
                ui.label(format!(
                    "{} | {} | layer {}",
                    self.session.mode().label(),
                    engine.tool().label(),
                    self.session.canvas().active_layer_idx()
                ));
                if engine.tool() == crate::app::tools::ToolKind::Brush {
                    ui.separator();
                    ui.label(format!(
                        "paint {}/{}",
                        engine.remaining(),
                        engine.options().brush_capacity
                    ));
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let canvas_w = self.session.canvas().width() as f32;
            let canvas_h = self.session.canvas().height() as f32;
            if self.first_frame {
                let available = ui.available_size();
                self.zoom = (available.x / canvas_w).min(available.y / canvas_h).min(1.0);
                self.first_frame = false;
            }

            let (rect, response) =
                ui.allocate_at_least(ui.available_size(), egui::Sense::click_and_drag());
            let origin = rect.min + egui::vec2(self.offset.x, self.offset.y);

            input_handler::handle_input(self, ctx, &response, origin);
            self.sync_texture();

            let canvas_rect =
                egui::Rect::from_min_size(origin, egui::vec2(canvas_w, canvas_h) * self.zoom);
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter_at(rect)
                .image(self.texture.id(), canvas_rect, uv, Color32::WHITE);
        });

        self.drain_events();

        if self.is_primary_down || self.session.is_previewing_shape() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
