//! Pixel surfaces and the layer stack that composites them.
pub mod canvas;
pub mod surface;
