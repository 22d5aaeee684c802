//! Quire: a book pagination engine
//!
//! This crate lays out markdown chapters onto fixed-size book pages:
//! - Greedy page fitting with word-boundary paragraph splits
//! - Chapter titles, subtitles, drop caps and small-caps lead-ins
//! - Running headers and page numbers on the outside edge
//! - A generated table of contents with correct page numbers

pub mod document;
pub mod error;
pub mod layout;
pub mod render;
pub mod theme;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmBook;

// Re-export primary types
pub use document::{Chapter, ChapterFlags, ChapterId, Project};
pub use error::{LayoutError, MeasureError};
pub use layout::{
    compose_page, ComposedPage, LayoutEngine, MetricsMeasure, PaginationState, RenderedBook,
    TextMeasure,
};
pub use render::{DisplayItem, DisplayPage};
pub use theme::Theme;

use serde::Serialize;

/// Page rectangle in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// A project and its theme, ready to be laid out
pub struct Book {
    pub project: Project,
    engine: LayoutEngine,
}

impl Book {
    pub fn new(project: Project, theme: Theme) -> Self {
        Self {
            project,
            engine: LayoutEngine::new(theme),
        }
    }

    /// Build a book from project and theme JSON
    pub fn from_json(project_json: &str, theme_json: &str) -> Result<Self, LayoutError> {
        Ok(Self::new(
            Project::from_json(project_json)?,
            Theme::from_json(theme_json)?,
        ))
    }

    pub fn theme(&self) -> &Theme {
        self.engine.theme()
    }

    /// Paginate and render every page
    pub fn generate(&self) -> Result<RenderedBook, LayoutError> {
        self.engine.generate(&self.project)
    }
}
