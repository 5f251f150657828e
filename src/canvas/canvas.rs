use eframe::egui::Color32;
use rayon::prelude::*;

use crate::canvas::surface::PixelSurface;
use crate::error::{PaintError, Result};
use crate::utils::profiler::ScopeTimer;

/// Single painting layer backed by its own full-size surface.
#[derive(Clone, Debug)]
pub struct Layer {
    pub name: String,
    surface: PixelSurface,
}

impl Layer {
    fn new(name: String, width: usize, height: usize, fill: Color32) -> Self {
        Self {
            name,
            surface: PixelSurface::new(width, height, fill),
        }
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }
}

/// Ordered stack of equally sized layers with one active layer.
///
/// Layer 0 is the background and starts filled with the background color;
/// the layers above it start transparent. Compositing runs bottom to top.
pub struct Canvas {
    width: usize,
    height: usize,
    background: Color32,
    layers: Vec<Layer>,
    active_layer_idx: usize,
}

impl Canvas {
    /// Create a canvas with `layer_count` layers (at least one), layer 0 active.
    pub fn new(width: usize, height: usize, layer_count: usize, background: Color32) -> Self {
        let layer_count = layer_count.max(1);
        let layers = (0..layer_count)
            .map(|idx| {
                let name = if idx == 0 {
                    "Background".to_string()
                } else {
                    format!("Layer {idx}")
                };
                Layer::new(name, width, height, initial_fill(idx, background))
            })
            .collect();

        Self {
            width,
            height,
            background,
            layers,
            active_layer_idx: 0,
        }
    }

    /// Current canvas width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Current canvas height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn active_layer_idx(&self) -> usize {
        self.active_layer_idx
    }

    pub fn active(&self) -> &PixelSurface {
        &self.layers[self.active_layer_idx].surface
    }

    /// The surface that receives all tool and shape mutations.
    pub fn active_mut(&mut self) -> &mut PixelSurface {
        &mut self.layers[self.active_layer_idx].surface
    }

    /// Make `idx` the active layer. Out-of-range indices are rejected and the
    /// current selection is kept.
    pub fn set_active_layer(&mut self, idx: usize) -> Result<()> {
        if idx >= self.layers.len() {
            return Err(PaintError::InvalidLayerIndex {
                index: idx,
                count: self.layers.len(),
            });
        }
        self.active_layer_idx = idx;
        Ok(())
    }

    /// Clear only the active layer to `color`.
    pub fn clear_active(&mut self, color: Color32) {
        self.active_mut().clear(color);
    }

    /// Composite every layer, bottom to top, into `out`.
    ///
    /// `out` is reallocated when its size does not match the canvas.
    pub fn composite_to(&self, out: &mut PixelSurface) {
        let _timer = ScopeTimer::new("composite");

        if out.width() != self.width || out.height() != self.height {
            *out = PixelSurface::new(self.width, self.height, Color32::TRANSPARENT);
        }
        let width = self.width;
        if width == 0 {
            return;
        }

        out.pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                row.fill(Color32::TRANSPARENT);
                let start = y * width;
                for layer in &self.layers {
                    let src = &layer.surface.pixels()[start..start + width];
                    for (dst, px) in row.iter_mut().zip(src) {
                        *dst = alpha_over(*px, *dst);
                    }
                }
            });
    }
}

fn initial_fill(layer_idx: usize, background: Color32) -> Color32 {
    if layer_idx == 0 {
        background
    } else {
        Color32::TRANSPARENT
    }
}

/// Standard "source over" alpha compositing for premultiplied colors.
pub fn alpha_over(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    if src_a == 255 {
        return src;
    }
    let dst_a = dst.a() as u32;
    let inv = 255 - src_a;
    let out_a = src_a + (dst_a * inv + 127) / 255;
    if out_a == 0 {
        return Color32::TRANSPARENT;
    }

    let out_r = src.r() as u32 + (dst.r() as u32 * inv + 127) / 255;
    let out_g = src.g() as u32 + (dst.g() as u32 * inv + 127) / 255;
    let out_b = src.b() as u32 + (dst.b() as u32 * inv + 127) / 255;

    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}

/// Scale a premultiplied color by `opacity_scale` / 255.
#[inline]
pub fn apply_opacity_scale(color: Color32, opacity_scale: u32) -> Color32 {
    if opacity_scale >= 255 {
        return color;
    }
    let a = (color.a() as u32 * opacity_scale + 127) / 255;
    let r = (color.r() as u32 * opacity_scale + 127) / 255;
    let g = (color.g() as u32 * opacity_scale + 127) / 255;
    let b = (color.b() as u32 * opacity_scale + 127) / 255;
    Color32::from_rgba_premultiplied(r as u8, g as u8, b as u8, a as u8)
}
