use eframe::egui::Color32;
use rand::Rng;

use crate::app::tools::ToolKind;
use crate::brush_engine::brush_options::{
    BRUSH_CAPACITY_RANGE, BRUSH_SIZE_RANGE, BrushOptions, SPRAY_DENSITY_RANGE, clamp_setting,
};
use crate::brush_engine::stroke::StrokeSegment;
use crate::canvas::surface::PixelSurface;
use crate::utils::vector::Vec2;

/// Eraser strokes paint the background color instead of clearing alpha.
pub const ERASER_COLOR: Color32 = Color32::WHITE;

/// What a single `handle_drag` call did to the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// The tool drew (spray may still have landed zero dots).
    Painted,
    /// The brush is out of paint; the surface was left untouched.
    Skipped,
    /// The brush drew its last unit of paint and is now empty.
    Depleted,
}

/// Applies the active tool to drag segments and tracks the brush reservoir.
#[derive(Clone, Debug)]
pub struct ToolEngine {
    options: BrushOptions,
    remaining: u32,
}

impl Default for ToolEngine {
    fn default() -> Self {
        Self::new(BrushOptions::default())
    }
}

impl ToolEngine {
    /// Create an engine with a full brush reservoir.
    pub fn new(options: BrushOptions) -> Self {
        let options = options.clamped();
        Self {
            remaining: options.brush_capacity,
            options,
        }
    }

    pub fn options(&self) -> &BrushOptions {
        &self.options
    }

    pub fn tool(&self) -> ToolKind {
        self.options.tool
    }

    /// Units of brush paint left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining == 0
    }

    /// Replace the whole tool configuration.
    ///
    /// Picking the brush always refills its reservoir to the capacity.
    pub fn reconfigure(&mut self, options: BrushOptions) {
        self.options = options.clamped();
        if self.options.tool == ToolKind::Brush {
            self.refill();
        } else {
            self.remaining = self.remaining.min(self.options.brush_capacity);
        }
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.reconfigure(BrushOptions {
            tool,
            ..self.options.clone()
        });
    }

    pub fn set_color(&mut self, color: Color32) {
        self.options.color = color;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.options.brush_size = clamp_setting("brush_size", size, &BRUSH_SIZE_RANGE);
    }

    pub fn set_spray_density(&mut self, density: u32) {
        self.options.spray_density = clamp_setting("spray_density", density, &SPRAY_DENSITY_RANGE);
    }

    /// Set a new paint budget and fill the reservoir to it.
    pub fn set_brush_capacity(&mut self, capacity: u32) {
        self.options.brush_capacity =
            clamp_setting("brush_capacity", capacity, &BRUSH_CAPACITY_RANGE);
        self.refill();
    }

    /// Top the brush back up to its capacity.
    pub fn refill(&mut self) {
        self.remaining = self.options.brush_capacity;
        log::debug!("brush refilled to {}", self.remaining);
    }

    /// Apply the active tool to `segment` on `surface`.
    pub fn handle_drag(&mut self, segment: StrokeSegment, surface: &mut PixelSurface) -> StrokeOutcome {
        self.handle_drag_with(&mut rand::rng(), segment, surface)
    }

    /// Same as [`ToolEngine::handle_drag`] with an explicit random source for the spray.
    pub fn handle_drag_with<R: Rng>(
        &mut self,
        rng: &mut R,
        segment: StrokeSegment,
        surface: &mut PixelSurface,
    ) -> StrokeOutcome {
        let size = self.options.brush_size as f32;
        match self.options.tool {
            ToolKind::Pen => {
                surface.draw_line(segment.from, segment.to, self.options.color, size, true);
                StrokeOutcome::Painted
            }
            ToolKind::Eraser => {
                surface.draw_line(segment.from, segment.to, ERASER_COLOR, size * 2.0, true);
                StrokeOutcome::Painted
            }
            ToolKind::Spray => {
                let dots = spray_with(
                    rng,
                    surface,
                    segment.to,
                    self.options.brush_size,
                    self.options.spray_density,
                    self.options.color,
                );
                log::trace!("spray landed {dots}/{} dots", self.options.spray_density);
                StrokeOutcome::Painted
            }
            ToolKind::Brush => self.brush_dab(segment.to, surface),
        }
    }

    /// Paint one filled circle and draw down the reservoir.
    fn brush_dab(&mut self, center: Vec2, surface: &mut PixelSurface) -> StrokeOutcome {
        if self.remaining == 0 {
            return StrokeOutcome::Skipped;
        }

        let radius = self.options.brush_size as f32;
        surface.fill_ellipse(center, radius, radius, self.options.color);
        self.remaining -= 1;

        if self.remaining == 0 {
            log::info!("brush is out of paint");
            StrokeOutcome::Depleted
        } else {
            StrokeOutcome::Painted
        }
    }
}

/// Scatter up to `density` single-pixel dots within `radius` of `center`.
///
/// Each attempt picks an integer offset in the bounding square and keeps it
/// only if it falls inside the disc, so `density` is a number of attempts,
/// not of guaranteed hits. Returns how many attempts landed.
pub fn spray_with<R: Rng>(
    rng: &mut R,
    surface: &mut PixelSurface,
    center: Vec2,
    radius: u32,
    density: u32,
    color: Color32,
) -> u32 {
    let r = radius as i32;
    let r_sq = r * r;
    let origin = center.round();
    let (cx, cy) = (origin.x as i32, origin.y as i32);

    let mut landed = 0;
    for _ in 0..density {
        let dx = rng.random_range(-r..=r);
        let dy = rng.random_range(-r..=r);
        if dx * dx + dy * dy <= r_sq {
            surface.put_pixel(cx + dx, cy + dy, color);
            landed += 1;
        }
    }
    landed
}
