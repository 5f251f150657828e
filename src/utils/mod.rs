//! Small shared helpers: color parsing, 2D math, export and timing.
pub mod color;
pub mod exporter;
pub mod profiler;
pub mod vector;
