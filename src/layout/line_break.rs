//! Line breaking algorithm

use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// One wrapped line
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpan {
    /// Byte range in the source text, trailing whitespace excluded
    pub byte_range: Range<usize>,
    /// Advance width in points
    pub width: f32,
}

/// Greedy line breaker
///
/// Lines break at Unicode line-break opportunities. Newlines are mandatory
/// breaks, and a word wider than the line is broken between graphemes.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `text` into lines no wider than `max_width`
    ///
    /// `scale` converts em widths to points (font size times face factor).
    /// Empty text still occupies one line.
    pub fn wrap(
        &self,
        text: &str,
        metrics: &FontMetrics,
        scale: f32,
        max_width: f32,
    ) -> Vec<LineSpan> {
        if text.is_empty() {
            return vec![LineSpan {
                byte_range: 0..0,
                width: 0.0,
            }];
        }

        let wrapper = Wrapper {
            text,
            metrics,
            scale,
            max_width,
        };
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut last_allowed: Option<usize> = None;

        for (pos, opportunity) in linebreaks(text) {
            if wrapper.width(line_start..pos) > max_width {
                if let Some(allowed) = last_allowed.take() {
                    lines.push(wrapper.line(line_start..allowed));
                    line_start = allowed;
                }
                line_start = wrapper.break_graphemes(line_start, pos, &mut lines);
            }

            match opportunity {
                BreakOpportunity::Mandatory => {
                    lines.push(wrapper.line(line_start..pos));
                    line_start = pos;
                    last_allowed = None;
                }
                BreakOpportunity::Allowed => last_allowed = Some(pos),
            }
        }

        if lines.is_empty() {
            lines.push(wrapper.line(0..text.len()));
        }
        lines
    }
}

struct Wrapper<'a> {
    text: &'a str,
    metrics: &'a FontMetrics,
    scale: f32,
    max_width: f32,
}

impl Wrapper<'_> {
    fn visible(&self, range: Range<usize>) -> Range<usize> {
        let trimmed = self.text[range.clone()].trim_end();
        range.start..range.start + trimmed.len()
    }

    fn width(&self, range: Range<usize>) -> f32 {
        let visible = self.visible(range);
        self.metrics.text_width(&self.text[visible]) * self.scale
    }

    fn line(&self, range: Range<usize>) -> LineSpan {
        let byte_range = self.visible(range);
        let width = self.metrics.text_width(&self.text[byte_range.clone()]) * self.scale;
        LineSpan { byte_range, width }
    }

    /// Emergency breaks inside a single word; returns the new line start
    fn break_graphemes(&self, mut start: usize, end: usize, lines: &mut Vec<LineSpan>) -> usize {
        while self.width(start..end) > self.max_width {
            let mut x = 0.0;
            let mut cut = start;
            for (offset, grapheme) in self.text[start..end].grapheme_indices(true) {
                let advance = self.metrics.text_width(grapheme) * self.scale;
                // Always take one grapheme so the loop advances
                if x + advance > self.max_width && cut > start {
                    break;
                }
                x += advance;
                cut = start + offset + grapheme.len();
            }
            if cut >= end {
                break;
            }
            lines.push(self.line(start..cut));
            start = cut;
        }
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_font() -> FontMetrics {
        FontMetrics::monospace(1.0)
    }

    #[test]
    fn test_empty_text() {
        let lines = LineBreaker::new().wrap("", &block_font(), 8.0, 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].byte_range, 0..0);
    }

    #[test]
    fn test_single_line() {
        let lines = LineBreaker::new().wrap("Hello", &block_font(), 8.0, 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].byte_range, 0..5);
        assert_eq!(lines[0].width, 40.0);
    }

    #[test]
    fn test_line_wrap() {
        // With 8pt per char, 40pt width = 5 chars per line
        let lines = LineBreaker::new().wrap("Hello World", &block_font(), 8.0, 40.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].byte_range, 0..5);
        assert_eq!(lines[1].byte_range, 6..11);
    }

    #[test]
    fn test_explicit_newline() {
        let lines = LineBreaker::new().wrap("Hello\nWorld", &block_font(), 8.0, 1000.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].byte_range, 0..5);
        assert_eq!(lines[1].byte_range, 6..11);
    }

    #[test]
    fn test_emergency_break() {
        let lines = LineBreaker::new().wrap("abcdefghij", &block_font(), 8.0, 40.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].byte_range, 0..5);
        assert_eq!(lines[1].byte_range, 5..10);
    }

    #[test]
    fn test_trailing_space_does_not_force_wrap() {
        let lines = LineBreaker::new().wrap("abcde ", &block_font(), 8.0, 40.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 40.0);
    }

    #[test]
    fn test_greedy_fill() {
        let text = "aa bb cc dd ee";
        let lines = LineBreaker::new().wrap(text, &block_font(), 1.0, 5.0);
        let words: Vec<&str> = lines.iter().map(|l| &text[l.byte_range.clone()]).collect();
        assert_eq!(words, vec!["aa bb", "cc dd", "ee"]);
    }
}
