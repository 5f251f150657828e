use eframe::egui::Color32;
use std::path::PathBuf;

use super::state::{InputMode, SessionEvent};
use super::tools::ToolKind;
use crate::brush_engine::brush::{StrokeOutcome, ToolEngine};
use crate::brush_engine::brush_options::BrushOptions;
use crate::brush_engine::stroke::StrokeState;
use crate::canvas::canvas::Canvas;
use crate::canvas::surface::PixelSurface;
use crate::config::{ExportSettings, Settings};
use crate::error::Result;
use crate::shapes::{ShapeKind, ShapePreviewController};
use crate::utils::color::{CustomPalette, color_to_hex};
use crate::utils::exporter::{self, ExportFormat};
use crate::utils::vector::Vec2;

/// Everything one painting session mutates: the layer stack, the tool
/// engine, the input mode and pending notices.
///
/// Front ends feed pointer and configuration events in and pull a
/// composited image out with [`PaintSession::render`].
pub struct PaintSession {
    canvas: Canvas,
    engine: ToolEngine,
    mode: InputMode,
    shape_box: (f32, f32),
    palette: CustomPalette,
    export: ExportSettings,
    events: Vec<SessionEvent>,
    dirty: bool,
}

impl PaintSession {
    pub fn new(settings: &Settings) -> Self {
        let canvas = Canvas::new(
            settings.canvas.width,
            settings.canvas.height,
            settings.canvas.layers,
            settings.canvas.background_color(),
        );
        Self::with_parts(
            canvas,
            settings.tools.brush_options(),
            (settings.shapes.preview_width, settings.shapes.preview_height),
            settings.export.clone(),
        )
    }

    pub fn with_parts(
        canvas: Canvas,
        options: BrushOptions,
        shape_box: (f32, f32),
        export: ExportSettings,
    ) -> Self {
        log::debug!(
            "new session: {}x{} canvas with {} layers",
            canvas.width(),
            canvas.height(),
            canvas.layer_count()
        );
        Self {
            canvas,
            engine: ToolEngine::new(options),
            mode: InputMode::Freehand(StrokeState::new()),
            shape_box,
            palette: CustomPalette::default(),
            export,
            events: Vec::new(),
            dirty: true,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn engine(&self) -> &ToolEngine {
        &self.engine
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn is_previewing_shape(&self) -> bool {
        matches!(self.mode, InputMode::ShapePreview(_))
    }

    pub fn export_settings(&self) -> &ExportSettings {
        &self.export
    }

    // --- pointer input ---

    pub fn pointer_down(&mut self, pos: Vec2) {
        if let InputMode::Freehand(stroke) = &mut self.mode {
            stroke.begin(pos);
        }
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        match &mut self.mode {
            InputMode::Freehand(stroke) => {
                let Some(segment) = stroke.advance(pos) else {
                    return;
                };
                match self.engine.handle_drag(segment, self.canvas.active_mut()) {
                    StrokeOutcome::Painted => self.dirty = true,
                    StrokeOutcome::Depleted => {
                        self.dirty = true;
                        self.events.push(SessionEvent::BrushDepleted);
                    }
                    StrokeOutcome::Skipped => {}
                }
            }
            InputMode::ShapePreview(shape) => {
                if shape.update_anchor(pos) {
                    self.dirty = true;
                }
            }
        }
    }

    pub fn pointer_up(&mut self, _pos: Vec2) {
        if let InputMode::Freehand(stroke) = &mut self.mode {
            stroke.end();
        }
    }

    /// Commit the armed shape at `pos`. Clicks in freehand mode do nothing.
    pub fn pointer_click(&mut self, pos: Vec2) {
        let InputMode::ShapePreview(shape) = &mut self.mode else {
            return;
        };
        let options = self.engine.options();
        let committed = shape.commit(
            pos,
            self.canvas.active_mut(),
            options.color,
            options.brush_size as f32,
        );
        if committed {
            self.mode = InputMode::Freehand(StrokeState::new());
            self.dirty = true;
        }
    }

    // --- configuration ---

    pub fn set_color(&mut self, color: Color32) {
        log::debug!("color changed to {}", color_to_hex(color));
        self.engine.set_color(color);
        self.dirty |= self.is_previewing_shape();
    }

    pub fn palette(&self) -> &CustomPalette {
        &self.palette
    }

    /// Keep the current color in the custom palette and return its slot.
    pub fn remember_color(&mut self) -> usize {
        self.palette.remember(self.engine.options().color)
    }

    /// Make a palette slot the current color. Unknown slots are ignored.
    pub fn pick_custom_color(&mut self, slot: usize) -> bool {
        match self.palette.get(slot) {
            Some(color) => {
                self.set_color(color);
                true
            }
            None => false,
        }
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.engine.set_brush_size(size);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("tool changed to {}", tool.label());
        self.engine.set_tool(tool);
    }

    pub fn set_spray_density(&mut self, density: u32) {
        self.engine.set_spray_density(density);
    }

    pub fn set_brush_capacity(&mut self, capacity: u32) {
        self.engine.set_brush_capacity(capacity);
    }

    /// Replace the whole tool configuration at once.
    pub fn apply_config(&mut self, options: BrushOptions) {
        self.engine.reconfigure(options);
    }

    /// Arm a shape. Any freehand stroke in progress ends here.
    pub fn select_shape(&mut self, kind: ShapeKind) {
        match &mut self.mode {
            InputMode::ShapePreview(shape) => shape.select_shape(kind),
            InputMode::Freehand(stroke) => {
                stroke.end();
                let (width, height) = self.shape_box;
                let mut shape = ShapePreviewController::new(width, height);
                shape.select_shape(kind);
                self.mode = InputMode::ShapePreview(shape);
            }
        }
        self.dirty = true;
    }

    /// Drop an armed shape without drawing it.
    pub fn cancel_shape(&mut self) {
        if self.is_previewing_shape() {
            self.mode = InputMode::Freehand(StrokeState::new());
            self.dirty = true;
        }
    }

    pub fn select_active_layer(&mut self, idx: usize) -> Result<()> {
        if let Err(err) = self.canvas.set_active_layer(idx) {
            log::warn!("{err}");
            return Err(err);
        }
        if let InputMode::Freehand(stroke) = &mut self.mode {
            stroke.end();
        }
        log::debug!("active layer is now {idx}");
        self.dirty = true;
        Ok(())
    }

    /// Fill the active layer with the background color. On an upper layer
    /// this hides everything beneath it, like the eraser does.
    pub fn clear_active_layer(&mut self) {
        let background = self.canvas.background();
        self.canvas.clear_active(background);
        self.dirty = true;
    }

    /// Flatten and write the canvas under the output directory. The outcome
    /// is also queued as a [`SessionEvent`].
    pub fn request_save(&mut self, format_hint: &str) -> Result<PathBuf> {
        let format = ExportFormat::from_token(format_hint);
        match exporter::export_canvas(&self.canvas, &self.export, format) {
            Ok(path) => {
                self.events.push(SessionEvent::Saved(path.clone()));
                Ok(path)
            }
            Err(err) => {
                log::warn!("Save failed: {err}");
                self.events.push(SessionEvent::SaveFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Save using the configured default format.
    pub fn request_default_save(&mut self) -> Result<PathBuf> {
        let hint = self.export.default_format.clone();
        self.request_save(&hint)
    }

    // --- output ---

    /// Composite the layers and any shape preview into `out`. Calling this
    /// repeatedly without input in between yields identical pixels.
    pub fn render(&self, out: &mut PixelSurface) {
        self.canvas.composite_to(out);
        if let InputMode::ShapePreview(shape) = &self.mode {
            let options = self.engine.options();
            shape.draw_preview(out, options.color, options.brush_size as f32);
        }
    }

    pub fn composite(&self) -> PixelSurface {
        let mut out = PixelSurface::new(self.canvas.width(), self.canvas.height(), Color32::TRANSPARENT);
        self.render(&mut out);
        out
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and reset the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> PaintSession {
        PaintSession::with_parts(
            Canvas::new(120, 90, 5, Color32::WHITE),
            BrushOptions::default(),
            (40.0, 40.0),
            ExportSettings::default(),
        )
    }

    #[test]
    fn drag_draws_on_active_layer_only() {
        let mut s = session();
        s.select_active_layer(3).unwrap();
        s.pointer_down(Vec2::new(10.0, 10.0));
        s.pointer_move(Vec2::new(60.0, 10.0));
        s.pointer_up(Vec2::new(60.0, 10.0));

        assert_eq!(s.canvas().layers()[3].surface().pixel(30, 10), Some(Color32::BLACK));
        for idx in [0, 1, 2, 4] {
            let layer = s.canvas().layers()[idx].surface();
            assert_eq!(layer.pixel(30, 10), Some(layer.pixel(100, 80).unwrap()));
        }
    }

    #[test]
    fn moves_without_press_do_not_draw() {
        let mut s = session();
        s.take_dirty();
        s.pointer_move(Vec2::new(10.0, 10.0));
        s.pointer_move(Vec2::new(50.0, 50.0));
        assert!(!s.is_dirty());
        assert!(s.canvas().active().pixels().iter().all(|p| *p == Color32::WHITE));
    }

    #[test]
    fn shape_mode_suppresses_freehand() {
        let mut s = session();
        s.select_shape(ShapeKind::Circle);
        s.pointer_down(Vec2::new(10.0, 10.0));
        s.pointer_move(Vec2::new(60.0, 60.0));
        s.pointer_up(Vec2::new(60.0, 60.0));
        assert!(s.canvas().active().pixels().iter().all(|p| *p == Color32::WHITE));
        assert!(s.is_previewing_shape());

        s.pointer_click(Vec2::new(60.0, 45.0));
        assert!(!s.is_previewing_shape());
        assert!(s.canvas().active().pixels().iter().any(|p| *p != Color32::WHITE));
    }

    #[test]
    fn click_in_freehand_is_a_noop() {
        let mut s = session();
        s.pointer_click(Vec2::new(50.0, 50.0));
        assert!(s.canvas().active().pixels().iter().all(|p| *p == Color32::WHITE));
    }

    #[test]
    fn preview_shows_in_render_but_not_in_layers() {
        let mut s = session();
        s.select_shape(ShapeKind::Square);
        s.pointer_move(Vec2::new(60.0, 45.0));

        let shown = s.composite();
        assert!(shown.pixels().iter().any(|p| *p != Color32::WHITE));
        assert!(s.canvas().active().pixels().iter().all(|p| *p == Color32::WHITE));
        assert_eq!(s.composite(), shown);

        s.cancel_shape();
        assert!(s.composite().pixels().iter().all(|p| *p == Color32::WHITE));
    }

    #[test]
    fn invalid_layer_keeps_selection() {
        let mut s = session();
        s.select_active_layer(2).unwrap();
        assert!(s.select_active_layer(5).is_err());
        assert_eq!(s.canvas().active_layer_idx(), 2);
    }

    #[test]
    fn depletion_is_reported_once() {
        let mut s = session();
        s.set_tool(ToolKind::Brush);
        s.set_brush_capacity(2);
        s.pointer_down(Vec2::new(10.0, 10.0));
        for x in [20.0, 30.0, 40.0, 50.0] {
            s.pointer_move(Vec2::new(x, 10.0));
        }
        assert_eq!(s.take_events(), vec![SessionEvent::BrushDepleted]);
        assert!(s.engine().is_depleted());
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn failed_save_queues_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let mut s = PaintSession::with_parts(
            Canvas::new(8, 8, 1, Color32::WHITE),
            BrushOptions::default(),
            (10.0, 10.0),
            ExportSettings {
                output_dir: blocker,
                ..ExportSettings::default()
            },
        );

        assert!(s.request_save("png").is_err());
        assert!(matches!(s.take_events().as_slice(), [SessionEvent::SaveFailed(_)]));
    }

    #[test]
    fn palette_survives_color_changes() {
        let mut s = session();
        let teal = Color32::from_rgb(0, 128, 128);
        s.set_color(teal);
        let slot = s.remember_color();
        s.set_color(Color32::BLACK);

        assert_eq!(s.palette().get(slot), Some(teal));
        assert!(s.pick_custom_color(slot));
        assert_eq!(s.engine().options().color, teal);
        assert!(!s.pick_custom_color(99));
        assert_eq!(s.engine().options().color, teal);
    }
}
