use std::path::PathBuf;

use crate::brush_engine::stroke::StrokeState;
use crate::shapes::ShapePreviewController;

/// How pointer input is interpreted. Freehand drawing and shape placement
/// never run at the same time.
pub enum InputMode {
    /// Drags go to the active tool.
    Freehand(StrokeState),
    /// Moves steer the floating preview; a click stamps it.
    ShapePreview(ShapePreviewController),
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Freehand(_) => "Freehand",
            InputMode::ShapePreview(_) => "Shape",
        }
    }
}

/// Notices for the front end, drained with `PaintSession::take_events`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The brush used its last unit of paint.
    BrushDepleted,
    Saved(PathBuf),
    SaveFailed(String),
}
