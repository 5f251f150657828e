use thiserror::Error;

/// Failures surfaced by the painting core.
#[derive(Debug, Error)]
pub enum PaintError {
    /// A layer selection outside `0..count`.
    #[error("layer index {index} is out of range (canvas has {count} layers)")]
    InvalidLayerIndex { index: usize, count: usize },

    /// The export directory or file could not be created or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image encoder rejected the flattened canvas.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PaintError>;
