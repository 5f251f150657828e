pub mod input_handler;
pub mod painter;
pub mod session;
pub mod state;
pub mod tools;

pub use painter::PainterApp;
pub use session::PaintSession;
pub use state::{InputMode, SessionEvent};
pub use tools::ToolKind;
