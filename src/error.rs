//! Error types for measurement and layout

use thiserror::Error;

/// Failure reported by a text measurement backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// Wrapping width is zero, negative or not finite
    #[error("invalid wrap width {0}pt")]
    InvalidWidth(f32),

    /// Font size or line spacing is zero, negative or not finite
    #[error("invalid font size {size}pt with line spacing {line_spacing}")]
    InvalidSize { size: f32, line_spacing: f32 },
}

/// Errors surfaced by pagination and the book driver
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("measurement failed: {0}")]
    Measure(#[from] MeasureError),

    /// A page index outside the rendered document was requested
    #[error("page {index} is out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// The fitter returned an unchanged state while reporting more content
    #[error("pagination of chapter {chapter} made no progress on page {page}")]
    Stalled { chapter: usize, page: u32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
