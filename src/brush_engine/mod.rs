//! Freehand tool configuration and the per-tool stroke algorithms.
pub mod brush;
pub mod brush_options;
pub mod stroke;
