//! Book styling: page geometry, typography and page furniture

mod trim;

pub use trim::TrimSize;

use crate::error::LayoutError;
use crate::layout::FontSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Horizontal alignment for headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

/// Where page numbers are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageNumberPosition {
    #[default]
    Top,
    Bottom,
    BottomCentered,
}

impl PageNumberPosition {
    pub fn is_bottom(&self) -> bool {
        matches!(self, PageNumberPosition::Bottom | PageNumberPosition::BottomCentered)
    }
}

/// What a running header shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderContent {
    #[default]
    None,
    BookTitle,
    Author,
    ChapterTitle,
}

/// Typography for a chapter title or subtitle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeadingStyle {
    pub font: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub alignment: TextAlignment,
    /// Space below the heading, in inches
    pub bottom_spacing: f32,
}

impl Default for HeadingStyle {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.to_string(),
            size: 24.0,
            bold: true,
            italic: false,
            alignment: TextAlignment::Center,
            bottom_spacing: 0.5,
        }
    }
}

impl HeadingStyle {
    fn subtitle() -> Self {
        Self {
            size: 18.0,
            bold: false,
            italic: true,
            bottom_spacing: 0.3,
            ..Self::default()
        }
    }

    pub fn font_spec(&self) -> FontSpec {
        FontSpec {
            family: self.font.clone(),
            bold: self.bold,
            italic: self.italic,
        }
    }
}

const DEFAULT_FONT: &str = "Times New Roman";

/// Complete styling theme for a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub trim_size: TrimSize,

    /// Binding-side margin, in inches
    pub inside_margin: f32,
    /// Outer-edge margin, in inches
    pub outside_margin: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,

    pub body_font: String,
    pub body_font_size: f32,
    /// Line height as a multiple of the font size
    pub line_spacing: f32,
    /// First-line indent, in inches
    pub paragraph_indent: f32,
    pub double_space: bool,
    pub drop_caps: bool,
    pub lead_with_small_caps: bool,

    pub chapter_title: HeadingStyle,
    pub chapter_subtitle: HeadingStyle,
    /// Space above the title on a chapter's first page, in inches
    pub chapter_heading_top_offset: f32,

    pub left_page_header: HeaderContent,
    pub left_page_header_capitalize: bool,
    pub right_page_header: HeaderContent,
    pub right_page_header_capitalize: bool,

    pub page_number_position: PageNumberPosition,
    pub show_subtitles_in_toc: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            trim_size: TrimSize::default(),
            inside_margin: 0.875,
            outside_margin: 0.5,
            top_margin: 0.75,
            bottom_margin: 0.75,
            body_font: DEFAULT_FONT.to_string(),
            body_font_size: 12.0,
            line_spacing: 1.2,
            paragraph_indent: 0.3,
            double_space: false,
            drop_caps: false,
            lead_with_small_caps: false,
            chapter_title: HeadingStyle::default(),
            chapter_subtitle: HeadingStyle::subtitle(),
            chapter_heading_top_offset: 1.5,
            left_page_header: HeaderContent::None,
            left_page_header_capitalize: false,
            right_page_header: HeaderContent::None,
            right_page_header_capitalize: false,
            page_number_position: PageNumberPosition::Top,
            show_subtitles_in_toc: false,
        }
    }
}

impl Theme {
    /// Parse a theme from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a theme file
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Page size in points
    pub fn page_size(&self) -> (f32, f32) {
        let (w, h) = self.trim_size.dimensions();
        (w * POINTS_PER_INCH, h * POINTS_PER_INCH)
    }

    /// Vertical space between top and bottom margins, in points
    pub fn content_height(&self) -> f32 {
        let (_, h) = self.page_size();
        h - (self.top_margin + self.bottom_margin) * POINTS_PER_INCH
    }

    /// (left, right) margins in points for a physical page number
    ///
    /// Odd pages sit on the right of a spread, so their binding edge is on the left.
    pub fn margins_for_page(&self, page_number: u32) -> (f32, f32) {
        let inside = self.inside_margin * POINTS_PER_INCH;
        let outside = self.outside_margin * POINTS_PER_INCH;
        if page_number % 2 == 1 {
            (inside, outside)
        } else {
            (outside, inside)
        }
    }

    /// Effective body line spacing
    pub fn body_line_spacing(&self) -> f32 {
        if self.double_space {
            self.line_spacing * 2.0
        } else {
            self.line_spacing
        }
    }

    pub fn body_font_spec(&self) -> FontSpec {
        FontSpec::regular(&self.body_font)
    }

    /// Height of one body line in points
    pub fn body_line_height(&self) -> f32 {
        self.body_font_size * self.body_line_spacing()
    }

    /// Number of non-breaking spaces used as a first-line indent
    pub fn indent_width_chars(&self) -> usize {
        (self.paragraph_indent * 8.0).ceil().max(0.0) as usize
    }
}
