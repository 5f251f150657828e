use serde::{Deserialize, Serialize};

/// Freehand tools the engine knows how to apply to a drag segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Spray,
    Brush,
}

impl ToolKind {
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Spray => "Spray",
            ToolKind::Brush => "Brush",
        }
    }

    pub fn all() -> &'static [ToolKind] {
        &[ToolKind::Pen, ToolKind::Eraser, ToolKind::Spray, ToolKind::Brush]
    }
}
