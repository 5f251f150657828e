use std::ops::RangeInclusive;

use eframe::egui::Color32;

use crate::app::tools::ToolKind;

/// Accepted brush sizes (pen width, eraser half-width, spray and brush radius).
pub const BRUSH_SIZE_RANGE: RangeInclusive<u32> = 1..=50;
/// Accepted spray attempts per move event.
pub const SPRAY_DENSITY_RANGE: RangeInclusive<u32> = 1..=500;
/// Accepted brush paint budgets.
pub const BRUSH_CAPACITY_RANGE: RangeInclusive<u32> = 1..=1000;

/// Current tool configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushOptions {
    pub tool: ToolKind,
    pub color: Color32,
    pub brush_size: u32,
    pub spray_density: u32,
    pub brush_capacity: u32,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: Color32::BLACK,
            brush_size: 3,
            spray_density: 10,
            brush_capacity: 100,
        }
    }
}

impl BrushOptions {
    /// Copy of these options with every numeric field pulled into its range.
    pub fn clamped(&self) -> Self {
        Self {
            tool: self.tool,
            color: self.color,
            brush_size: clamp_setting("brush_size", self.brush_size, &BRUSH_SIZE_RANGE),
            spray_density: clamp_setting("spray_density", self.spray_density, &SPRAY_DENSITY_RANGE),
            brush_capacity: clamp_setting(
                "brush_capacity",
                self.brush_capacity,
                &BRUSH_CAPACITY_RANGE,
            ),
        }
    }
}

/// Clamp `value` into `range`, warning when it had to move.
pub fn clamp_setting(name: &str, value: u32, range: &RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        log::warn!(
            "{name} {value} is outside {}..={}, using {clamped}",
            range.start(),
            range.end()
        );
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_pulls_values_into_range() {
        let opts = BrushOptions {
            brush_size: 0,
            spray_density: 9_999,
            brush_capacity: 0,
            ..BrushOptions::default()
        }
        .clamped();
        assert_eq!(opts.brush_size, 1);
        assert_eq!(opts.spray_density, 500);
        assert_eq!(opts.brush_capacity, 1);
    }

    #[test]
    fn in_range_values_are_untouched() {
        let opts = BrushOptions::default();
        assert_eq!(opts.clamped(), opts);
    }
}
