//! User settings loaded from `~/.config/rusty-sketchpad/config.toml`.
//!
//! Every section is optional; missing values use the defaults below and
//! out-of-range values are clamped with a warning.
//!
//! # Example TOML
//! ```toml
//! [canvas]
//! width = 1024
//! height = 768
//! layers = 5
//!
//! [tools]
//! tool = "spray"
//! color = "#1e90ff"
//! brush_size = 8
//!
//! [export]
//! output_dir = "~/Pictures/Sketches"
//! default_format = "jpg"
//! ```

use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::tools::ToolKind;
use crate::brush_engine::brush_options::{
    BRUSH_CAPACITY_RANGE, BRUSH_SIZE_RANGE, BrushOptions, SPRAY_DENSITY_RANGE, clamp_setting,
};
use crate::utils::color::parse_color;

const APP_DIR: &str = "rusty-sketchpad";
const MAX_LAYERS: usize = 16;
const MAX_CANVAS_SIDE: usize = 8192;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub canvas: CanvasSettings,
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default)]
    pub shapes: ShapeSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

/// Canvas dimensions and layer count, fixed for the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: usize,
    pub height: usize,
    pub layers: usize,
    pub background: String,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            layers: 5,
            background: "white".to_string(),
        }
    }
}

impl CanvasSettings {
    pub fn background_color(&self) -> Color32 {
        parse_color(&self.background).unwrap_or(Color32::WHITE)
    }
}

/// Initial freehand tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: String,
    pub brush_size: u32,
    pub spray_density: u32,
    pub brush_capacity: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        let defaults = BrushOptions::default();
        Self {
            tool: defaults.tool,
            color: "black".to_string(),
            brush_size: defaults.brush_size,
            spray_density: defaults.spray_density,
            brush_capacity: defaults.brush_capacity,
        }
    }
}

impl ToolSettings {
    pub fn brush_options(&self) -> BrushOptions {
        BrushOptions {
            tool: self.tool,
            color: parse_color(&self.color).unwrap_or(Color32::BLACK),
            brush_size: self.brush_size,
            spray_density: self.spray_density,
            brush_capacity: self.brush_capacity,
        }
    }
}

/// Size of the floating box shapes are placed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    pub preview_width: f32,
    pub preview_height: f32,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            preview_width: 150.0,
            preview_height: 100.0,
        }
    }
}

/// Where and how flattened images are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    /// chrono format string; the extension is appended.
    pub filename_template: String,
    pub default_format: String,
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: dirs::desktop_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ImagensMiniPaint"),
            filename_template: "MiniPaint_%Y%m%d_%H%M%S".to_string(),
            default_format: "png".to_string(),
            jpeg_quality: 90,
        }
    }
}

impl Settings {
    /// Path of the settings file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::info!("No config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        settings.validate();
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Clamp every value into the range the core accepts.
    pub fn validate(&mut self) {
        let canvas = &mut self.canvas;
        canvas.width = clamp_usize("canvas.width", canvas.width, 1, MAX_CANVAS_SIDE);
        canvas.height = clamp_usize("canvas.height", canvas.height, 1, MAX_CANVAS_SIDE);
        canvas.layers = clamp_usize("canvas.layers", canvas.layers, 1, MAX_LAYERS);
        if parse_color(&canvas.background).is_none() {
            log::warn!("Unknown canvas.background {:?}, using white", canvas.background);
            canvas.background = "white".to_string();
        }

        let tools = &mut self.tools;
        tools.brush_size = clamp_setting("tools.brush_size", tools.brush_size, &BRUSH_SIZE_RANGE);
        tools.spray_density =
            clamp_setting("tools.spray_density", tools.spray_density, &SPRAY_DENSITY_RANGE);
        tools.brush_capacity =
            clamp_setting("tools.brush_capacity", tools.brush_capacity, &BRUSH_CAPACITY_RANGE);
        if parse_color(&tools.color).is_none() {
            log::warn!("Unknown tools.color {:?}, using black", tools.color);
            tools.color = "black".to_string();
        }

        let shapes = &mut self.shapes;
        shapes.preview_width = shapes.preview_width.clamp(4.0, MAX_CANVAS_SIDE as f32);
        shapes.preview_height = shapes.preview_height.clamp(4.0, MAX_CANVAS_SIDE as f32);

        let export = &mut self.export;
        export.jpeg_quality = export.jpeg_quality.clamp(1, 100);
        if let Some(stripped) = export.output_dir.to_str().and_then(|p| p.strip_prefix("~/"))
            && let Some(home) = dirs::home_dir()
        {
            export.output_dir = home.join(stripped);
        }
    }
}

fn clamp_usize(name: &str, value: usize, min: usize, max: usize) -> usize {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{name} {value} is outside {min}..={max}, using {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings.canvas.layers, 5);
        assert_eq!(settings.tools.tool, ToolKind::Pen);
        assert_eq!(settings.export.default_format, "png");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[tools]\ntool = \"spray\"\ncolor = \"#ff0000\"\n\n[canvas]\nlayers = 3\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.tools.tool, ToolKind::Spray);
        assert_eq!(settings.canvas.layers, 3);
        assert_eq!(settings.canvas.width, 800);
        let opts = settings.tools.brush_options();
        assert_eq!(opts.color, Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[canvas]\nlayers = 0\nwidth = 0\n\n[tools]\nbrush_size = 99\nspray_density = 0\ncolor = \"plaid\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.canvas.layers, 1);
        assert_eq!(settings.canvas.width, 1);
        assert_eq!(settings.tools.brush_size, 50);
        assert_eq!(settings.tools.spray_density, 1);
        assert_eq!(settings.tools.color, "black");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[canvas\nwidth = ").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
