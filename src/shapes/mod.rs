//! Shape placement: a floating dashed preview that follows the pointer and is
//! stamped onto the active layer on click.
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::canvas::surface::PixelSurface;
use crate::utils::vector::{Rect, Vec2};

/// Dash and gap lengths of the preview outline, in pixels.
pub const PREVIEW_DASH: f32 = 6.0;
pub const PREVIEW_GAP: f32 = 4.0;
/// Number of straight pieces used to approximate a dashed ellipse.
const ELLIPSE_PREVIEW_SEGMENTS: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Ellipse,
    Circle,
    Square,
    Triangle,
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Circle => "Circle",
            ShapeKind::Square => "Square",
            ShapeKind::Triangle => "Triangle",
        }
    }

    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Ellipse,
            ShapeKind::Circle,
            ShapeKind::Square,
            ShapeKind::Triangle,
        ]
    }

    /// Geometry of this shape centered on `anchor` inside a `width` x `height`
    /// box. Everything but the ellipse uses a square of side `min(width, height)`.
    pub fn outline(&self, anchor: Vec2, width: f32, height: f32) -> ShapeOutline {
        let side = width.min(height);
        let square = Rect::from_center_size(anchor, side, side);
        match self {
            ShapeKind::Ellipse => {
                ShapeOutline::Ellipse(Rect::from_center_size(anchor, width, height))
            }
            ShapeKind::Circle => ShapeOutline::Ellipse(square),
            ShapeKind::Square => ShapeOutline::Rect(square),
            ShapeKind::Triangle => ShapeOutline::Polygon(vec![
                Vec2::new(anchor.x, square.min.y),
                Vec2::new(square.min.x, square.max.y),
                Vec2::new(square.max.x, square.max.y),
            ]),
        }
    }
}

/// Resolved outline of a shape in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeOutline {
    Ellipse(Rect),
    Rect(Rect),
    Polygon(Vec<Vec2>),
}

impl ShapeOutline {
    /// Rasterize the solid outline.
    pub fn stroke(&self, surface: &mut PixelSurface, color: Color32, width: f32) {
        match self {
            ShapeOutline::Ellipse(rect) => surface.stroke_ellipse(*rect, color, width),
            ShapeOutline::Rect(rect) => surface.stroke_rect(*rect, color, width),
            ShapeOutline::Polygon(points) => surface.stroke_polygon(points, color, width),
        }
    }

    /// Rasterize the dashed preview outline.
    pub fn stroke_dashed(&self, surface: &mut PixelSurface, color: Color32, width: f32) {
        let points = self.vertices();
        surface.stroke_dashed_polyline(&points, true, color, width, PREVIEW_DASH, PREVIEW_GAP);
    }

    /// Closed polygon through the outline; ellipses are sampled.
    pub fn vertices(&self) -> Vec<Vec2> {
        match self {
            ShapeOutline::Ellipse(rect) => {
                let center = rect.center();
                let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
                (0..ELLIPSE_PREVIEW_SEGMENTS)
                    .map(|i| {
                        let t = i as f32 / ELLIPSE_PREVIEW_SEGMENTS as f32 * std::f32::consts::TAU;
                        Vec2::new(center.x + rx * t.cos(), center.y + ry * t.sin())
                    })
                    .collect()
            }
            ShapeOutline::Rect(rect) => rect.corners().to_vec(),
            ShapeOutline::Polygon(points) => points.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewState {
    Inactive,
    Previewing {
        kind: ShapeKind,
        anchor: Option<Vec2>,
    },
}

/// Arms a shape, tracks its floating preview and commits it on confirmation.
#[derive(Debug, Clone)]
pub struct ShapePreviewController {
    state: PreviewState,
    width: f32,
    height: f32,
}

impl ShapePreviewController {
    /// Create an inactive controller with a fixed preview box.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            state: PreviewState::Inactive,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PreviewState::Previewing { .. })
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        match self.state {
            PreviewState::Previewing { kind, .. } => Some(kind),
            PreviewState::Inactive => None,
        }
    }

    pub fn anchor(&self) -> Option<Vec2> {
        match self.state {
            PreviewState::Previewing { anchor, .. } => anchor,
            PreviewState::Inactive => None,
        }
    }

    pub fn preview_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Arm `kind`. Any previous preview is replaced and the anchor cleared.
    pub fn select_shape(&mut self, kind: ShapeKind) {
        log::debug!("shape armed: {}", kind.label());
        self.state = PreviewState::Previewing { kind, anchor: None };
    }

    /// Move the floating preview to `point`. Returns whether a redraw is needed.
    pub fn update_anchor(&mut self, point: Vec2) -> bool {
        match &mut self.state {
            PreviewState::Previewing { anchor, .. } => {
                *anchor = Some(point);
                true
            }
            PreviewState::Inactive => false,
        }
    }

    /// The outline currently following the pointer, if any.
    pub fn preview_outline(&self) -> Option<ShapeOutline> {
        match self.state {
            PreviewState::Previewing {
                kind,
                anchor: Some(anchor),
            } => Some(kind.outline(anchor, self.width, self.height)),
            _ => None,
        }
    }

    /// Draw the dashed preview onto a display surface (never a layer), at
    /// the width the committed outline will have.
    pub fn draw_preview(&self, display: &mut PixelSurface, color: Color32, width: f32) {
        if let Some(outline) = self.preview_outline() {
            outline.stroke_dashed(display, color, width);
        }
    }

    /// Stamp the solid outline at `point` and disarm. Returns `false`, leaving
    /// `surface` untouched, when no shape is armed.
    pub fn commit(
        &mut self,
        point: Vec2,
        surface: &mut PixelSurface,
        color: Color32,
        stroke_width: f32,
    ) -> bool {
        let PreviewState::Previewing { kind, .. } = self.state else {
            return false;
        };
        kind.outline(point, self.width, self.height)
            .stroke(surface, color, stroke_width);
        log::debug!("committed {} at ({}, {})", kind.label(), point.x, point.y);
        self.state = PreviewState::Inactive;
        true
    }

    /// Disarm without drawing anything.
    pub fn cancel(&mut self) {
        self.state = PreviewState::Inactive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> PixelSurface {
        PixelSurface::new(200, 200, Color32::WHITE)
    }

    #[test]
    fn starts_inactive() {
        let ctl = ShapePreviewController::new(100.0, 60.0);
        assert_eq!(ctl.state(), PreviewState::Inactive);
        assert_eq!(ctl.kind(), None);
    }

    #[test]
    fn select_then_anchor() {
        let mut ctl = ShapePreviewController::new(100.0, 60.0);
        assert!(!ctl.update_anchor(Vec2::new(1.0, 1.0)));
        ctl.select_shape(ShapeKind::Square);
        assert_eq!(ctl.anchor(), None);
        assert!(ctl.update_anchor(Vec2::new(50.0, 40.0)));
        assert_eq!(ctl.anchor(), Some(Vec2::new(50.0, 40.0)));
        assert_eq!(ctl.kind(), Some(ShapeKind::Square));
    }

    #[test]
    fn geometry_per_kind() {
        let anchor = Vec2::new(100.0, 100.0);
        assert_eq!(
            ShapeKind::Ellipse.outline(anchor, 80.0, 40.0),
            ShapeOutline::Ellipse(Rect::from_center_size(anchor, 80.0, 40.0))
        );
        assert_eq!(
            ShapeKind::Circle.outline(anchor, 80.0, 40.0),
            ShapeOutline::Ellipse(Rect::from_center_size(anchor, 40.0, 40.0))
        );
        assert_eq!(
            ShapeKind::Square.outline(anchor, 80.0, 40.0),
            ShapeOutline::Rect(Rect::from_center_size(anchor, 40.0, 40.0))
        );
        assert_eq!(
            ShapeKind::Triangle.outline(anchor, 80.0, 40.0),
            ShapeOutline::Polygon(vec![
                Vec2::new(100.0, 80.0),
                Vec2::new(80.0, 120.0),
                Vec2::new(120.0, 120.0),
            ])
        );
    }

    #[test]
    fn commit_draws_once_then_is_a_noop() {
        let mut ctl = ShapePreviewController::new(60.0, 60.0);
        let mut s = surface();
        ctl.select_shape(ShapeKind::Square);
        for x in [10.0, 50.0, 90.0] {
            ctl.update_anchor(Vec2::new(x, 100.0));
        }
        assert_eq!(s, surface());

        assert!(ctl.commit(Vec2::new(100.0, 100.0), &mut s, Color32::BLACK, 2.0));
        assert_eq!(ctl.state(), PreviewState::Inactive);
        assert_eq!(s.pixel(70, 100), Some(Color32::BLACK));
        assert_eq!(s.pixel(100, 100), Some(Color32::WHITE));

        let after_first = s.clone();
        assert!(!ctl.commit(Vec2::new(30.0, 30.0), &mut s, Color32::BLACK, 2.0));
        assert_eq!(s, after_first);
    }

    #[test]
    fn preview_draws_dashes_not_the_solid_outline() {
        let mut ctl = ShapePreviewController::new(60.0, 60.0);
        ctl.select_shape(ShapeKind::Circle);
        ctl.update_anchor(Vec2::new(100.0, 100.0));

        let mut dashed = surface();
        ctl.draw_preview(&mut dashed, Color32::BLACK, 1.0);
        let mut solid = surface();
        ctl.commit(Vec2::new(100.0, 100.0), &mut solid, Color32::BLACK, 1.0);

        let count = |s: &PixelSurface| s.pixels().iter().filter(|p| **p != Color32::WHITE).count();
        assert!(count(&dashed) > 0);
        assert!(count(&dashed) < count(&solid));
    }

    #[test]
    fn cancel_disarms_without_drawing() {
        let mut ctl = ShapePreviewController::new(60.0, 60.0);
        let mut s = surface();
        ctl.select_shape(ShapeKind::Triangle);
        ctl.cancel();
        assert!(!ctl.commit(Vec2::new(100.0, 100.0), &mut s, Color32::BLACK, 2.0));
        assert_eq!(s, surface());
    }
}
