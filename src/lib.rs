pub mod app;
pub mod brush_engine;
pub mod canvas;
pub mod config;
pub mod error;
pub mod shapes;
pub mod ui;
pub mod utils;

pub use app::{InputMode, PaintSession, PainterApp, SessionEvent, ToolKind};
pub use config::Settings;
pub use error::{PaintError, Result};
