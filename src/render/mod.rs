//! Render output: positioned display lists for finished pages

mod display;

pub use display::{DisplayItem, DisplayPage, HeadingLevel, PageRenderer, DROP_CAP_GAP};
