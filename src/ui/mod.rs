//! egui panels that configure the tools, shapes, layers and saving.
pub mod layers;
pub mod tool_bar;
