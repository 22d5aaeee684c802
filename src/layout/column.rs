//! Height of a page's column of fragments
//!
//! A column is measured as a whole: decorations above the first fragment
//! depend on what the page holds, so the height of a list is not the sum of
//! independent fragment heights.

use crate::document::strip;
use crate::error::MeasureError;
use crate::layout::font::FontSpec;
use crate::layout::measure::TextMeasure;
use crate::layout::pagination::{Fragment, FragmentKind};
use crate::theme::{PageNumberPosition, Theme, POINTS_PER_INCH};
use rustc_hash::FxHashMap;

/// Space below every paragraph or chunk, in points
pub const PARAGRAPH_GAP: f32 = 8.0;

/// Height of the top page-number band, in points
pub const HEADER_BAND: f32 = 0.5 * POINTS_PER_INCH;

/// Line spacing used for chapter headings
pub const HEADING_LINE_SPACING: f32 = 1.2;

/// Non-breaking space used for first-line indents
pub const INDENT_CHAR: char = '\u{00A0}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BlockKey {
    kind: FragmentKind,
    indent: bool,
    paragraph_index: Option<usize>,
    run_offset: usize,
    len: usize,
}

impl BlockKey {
    fn of(fragment: &Fragment) -> Self {
        Self {
            kind: fragment.kind,
            indent: fragment.indent,
            paragraph_index: fragment.paragraph_index,
            run_offset: fragment.run_offset,
            len: fragment.text.len(),
        }
    }
}

/// Measures lists of fragments for one page
pub struct Column<'a, M: TextMeasure + ?Sized> {
    theme: &'a Theme,
    measure: &'a M,
    width: f32,
    show_page_numbers: bool,
    body_font: FontSpec,
    title_font: FontSpec,
    subtitle_font: FontSpec,
    indent_prefix: String,
    /// Heights of fragments already measured on this page
    blocks: FxHashMap<BlockKey, f32>,
}

impl<'a, M: TextMeasure + ?Sized> Column<'a, M> {
    pub fn new(theme: &'a Theme, measure: &'a M, width: f32, show_page_numbers: bool) -> Self {
        Self {
            theme,
            measure,
            width,
            show_page_numbers,
            body_font: theme.body_font_spec(),
            title_font: theme.chapter_title.font_spec(),
            subtitle_font: theme.chapter_subtitle.font_spec(),
            indent_prefix: indent_prefix(theme),
            blocks: FxHashMap::default(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Space above the title on a chapter's opening page
    pub fn top_offset(&self, has_title: bool) -> f32 {
        if has_title {
            self.theme.chapter_heading_top_offset * POINTS_PER_INCH
        } else {
            0.0
        }
    }

    /// Page-number band at the top of pages without a title
    pub fn header_band(&self, has_title: bool) -> f32 {
        if self.show_page_numbers
            && !has_title
            && self.theme.page_number_position == PageNumberPosition::Top
        {
            HEADER_BAND
        } else {
            0.0
        }
    }

    /// Total height of `fragments`
    pub fn height(&mut self, fragments: &[Fragment]) -> Result<f32, MeasureError> {
        let has_title = fragments.iter().any(|f| f.kind == FragmentKind::Title);
        let mut total = self.top_offset(has_title) + self.header_band(has_title);
        for fragment in fragments {
            total += self.block_height(fragment)?;
        }
        Ok(total)
    }

    /// Total height of `accepted` followed by `candidate`
    pub fn height_with(
        &mut self,
        accepted: &[Fragment],
        candidate: &Fragment,
    ) -> Result<f32, MeasureError> {
        let has_title = candidate.kind == FragmentKind::Title
            || accepted.iter().any(|f| f.kind == FragmentKind::Title);
        let mut total = self.top_offset(has_title) + self.header_band(has_title);
        for fragment in accepted {
            total += self.block_height(fragment)?;
        }
        Ok(total + self.block_height(candidate)?)
    }

    /// Height of one fragment including the space below it
    pub fn block_height(&mut self, fragment: &Fragment) -> Result<f32, MeasureError> {
        let key = BlockKey::of(fragment);
        if let Some(height) = self.blocks.get(&key) {
            return Ok(*height);
        }

        let theme = self.theme;
        let height = match fragment.kind {
            FragmentKind::Title => {
                let style = &theme.chapter_title;
                self.measure
                    .measure(
                        &fragment.text,
                        &self.title_font,
                        style.size,
                        HEADING_LINE_SPACING,
                        self.width,
                    )?
                    .height
                    + style.bottom_spacing * POINTS_PER_INCH
            }
            FragmentKind::Subtitle => {
                let style = &theme.chapter_subtitle;
                self.measure
                    .measure(
                        &fragment.text,
                        &self.subtitle_font,
                        style.size,
                        HEADING_LINE_SPACING,
                        self.width,
                    )?
                    .height
                    + style.bottom_spacing * POINTS_PER_INCH
            }
            FragmentKind::Paragraph | FragmentKind::Chunk => {
                let mut text = String::with_capacity(fragment.text.len() + 8);
                if fragment.indent {
                    text.push_str(&self.indent_prefix);
                }
                text.push_str(&strip(&fragment.text));
                self.measure
                    .measure(
                        &text,
                        &self.body_font,
                        theme.body_font_size,
                        theme.body_line_spacing(),
                        self.width,
                    )?
                    .height
                    + PARAGRAPH_GAP
            }
        };

        self.blocks.insert(key, height);
        Ok(height)
    }
}

/// Run of non-breaking spaces used as a first-line indent
pub fn indent_prefix(theme: &Theme) -> String {
    std::iter::repeat(INDENT_CHAR)
        .take(theme.indent_width_chars())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::measure::MetricsMeasure;

    fn paragraph(text: &str, index: usize) -> Fragment {
        Fragment::body(FragmentKind::Paragraph, text, index > 0, index, 0)
    }

    #[test]
    fn test_paragraph_height_includes_gap() {
        let theme = Theme::default();
        let measure = MetricsMeasure::default();
        let mut column = Column::new(&theme, &measure, 300.0, false);
        let h = column.height(&[paragraph("Short line.", 0)]).unwrap();
        assert!((h - (theme.body_line_height() + PARAGRAPH_GAP)).abs() < 1e-3);
    }

    #[test]
    fn test_title_adds_top_offset() {
        let theme = Theme::default();
        let measure = MetricsMeasure::default();
        let mut column = Column::new(&theme, &measure, 300.0, false);
        let h = column.height(&[Fragment::title("One")]).unwrap();
        let expected = 1.5 * 72.0 + 24.0 * 1.2 + 0.5 * 72.0;
        assert!((h - expected).abs() < 1e-3);
    }

    #[test]
    fn test_header_band_only_without_title() {
        let theme = Theme::default();
        let measure = MetricsMeasure::default();
        let mut column = Column::new(&theme, &measure, 300.0, true);
        assert_eq!(column.header_band(false), HEADER_BAND);
        assert_eq!(column.header_band(true), 0.0);

        let body = column.height(&[paragraph("Text.", 1)]).unwrap();
        assert!((body - (HEADER_BAND + theme.body_line_height() + PARAGRAPH_GAP)).abs() < 1e-3);
    }

    #[test]
    fn test_height_with_matches_height() {
        let theme = Theme::default();
        let measure = MetricsMeasure::default();
        let mut column = Column::new(&theme, &measure, 200.0, true);
        let accepted = vec![Fragment::title("Title"), paragraph("First.", 0)];
        let candidate = paragraph("Second paragraph with a few more words in it.", 1);

        let with = column.height_with(&accepted, &candidate).unwrap();
        let mut all = accepted.clone();
        all.push(candidate);
        assert_eq!(with, column.height(&all).unwrap());
    }

    #[test]
    fn test_indent_prefix() {
        let theme = Theme::default();
        assert_eq!(indent_prefix(&theme), "\u{00A0}\u{00A0}\u{00A0}");
    }
}
