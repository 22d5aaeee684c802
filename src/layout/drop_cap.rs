//! Drop caps and small-caps lead-ins for a chapter's opening paragraph
//!
//! Both splitters work on the stripped text and carry the split point back
//! into the markdown, closing any emphasis left open on either side.

use crate::document::markdown::{balance_split, strip_mapped, StrippedText};
use crate::layout::font::FontSpec;
use crate::layout::measure::TextMeasure;
use log::warn;

/// Words taken into a small-caps lead-in
pub const SMALL_CAPS_WORDS: usize = 4;

/// Punctuation that ends a small-caps lead-in
const LEAD_IN_STOPS: [char; 6] = ['.', ',', '"', '\'', '!', '?'];

const MARKER_CHARS: [char; 4] = ['*', '_', '+', '~'];

/// Text flowing beside a drop cap and the text continuing below it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapSplit {
    pub beside: String,
    pub below: String,
}

/// A small-caps lead-in and the rest of the paragraph
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmallCapsSplit {
    pub small_caps: String,
    /// Remainder, leading whitespace kept
    pub rest: String,
}

/// Byte ranges of whitespace-separated words
fn word_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_word {
                ends.push(i);
            }
            in_word = false;
        } else {
            in_word = true;
        }
    }
    if in_word {
        ends.push(text.len());
    }
    ends
}

/// Move a source offset past closing markers and on to the next space
fn walk_to_space(markdown: &str, mut pos: usize) -> usize {
    while let Some(c) = markdown[pos..].chars().next() {
        if c.is_whitespace() {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

/// Move a source offset past markers glued to the split point
fn walk_markers(markdown: &str, mut pos: usize) -> usize {
    while let Some(c) = markdown[pos..].chars().next() {
        if !MARKER_CHARS.contains(&c) {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

/// Plain-text byte length of the small-caps lead-in
fn lead_in_end(plain: &str) -> usize {
    let mut words = 0;
    let mut in_word = false;
    let mut word_start = 0;
    let mut end = 0;
    let mut chars = plain.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            if in_word {
                words += 1;
                end = i;
                if words == SMALL_CAPS_WORDS {
                    return end;
                }
            }
            in_word = false;
            continue;
        }
        if !in_word {
            in_word = true;
            word_start = i;
        }
        // Leading quotes belong to the word; an apostrophe inside one does not stop it
        let followed_by_letter = chars.peek().is_some_and(|&(_, n)| n.is_alphanumeric());
        if i > word_start && LEAD_IN_STOPS.contains(&c) && !followed_by_letter {
            return i + c.len_utf8();
        }
    }

    if in_word {
        plain.len()
    } else {
        end
    }
}

/// Split the opening of a paragraph into a small-caps lead-in and the rest
///
/// Takes up to four words, stopping at the first sentence punctuation,
/// which stays with the lead-in.
pub fn split_for_small_caps(markdown: &str) -> SmallCapsSplit {
    let stripped = strip_mapped(markdown);
    let plain_end = lead_in_end(stripped.text());
    if plain_end == 0 {
        return SmallCapsSplit {
            small_caps: String::new(),
            rest: markdown.to_string(),
        };
    }

    let split = walk_markers(markdown, stripped.source_end(plain_end));
    let (small_caps, rest) = balance_split(&markdown[..split], &markdown[split..]);
    SmallCapsSplit { small_caps, rest }
}

/// Geometry and typography for [`split_for_drop_cap`]
#[derive(Debug, Clone)]
pub struct DropCapBox<'a> {
    /// Width of the column beside the cap, in points
    pub width_beside: f32,
    /// Height of the cap, in points
    pub cap_height: f32,
    pub font: &'a FontSpec,
    pub size: f32,
    pub line_spacing: f32,
    /// Measure the lead-in as capitals
    pub using_small_caps: bool,
}

/// Uppercase the lead-in so small caps measure as wide as they render
fn measurement_text(stripped: &StrippedText, end: usize, using_small_caps: bool) -> String {
    let text = &stripped.text()[..end];
    if !using_small_caps {
        return text.to_string();
    }
    let lead = lead_in_end(stripped.text()).min(end);
    let mut out = text[..lead].to_uppercase();
    out.push_str(&text[lead..]);
    out
}

/// Split a paragraph into text set beside a drop cap and text below it
///
/// Words are added one at a time while the block stays within two lines.
/// If even the first word takes more than two lines, the cap height is the
/// limit instead. A measurement failure stops the growth where it is.
pub fn split_for_drop_cap<M: TextMeasure + ?Sized>(
    markdown: &str,
    cap: &DropCapBox<'_>,
    measure: &M,
) -> CapSplit {
    let stripped = strip_mapped(markdown);
    let ends = word_ends(stripped.text());
    let two_lines = cap.size * cap.line_spacing * 2.0;
    let limit = two_lines.max(cap.cap_height);

    let mut within_two_lines = 0;
    let mut within_cap = 0;
    for (count, &end) in ends.iter().enumerate() {
        let text = measurement_text(&stripped, end, cap.using_small_caps);
        let height = match measure.measure(
            &text,
            cap.font,
            cap.size,
            cap.line_spacing,
            cap.width_beside,
        ) {
            Ok(extent) => extent.height,
            Err(err) => {
                warn!("drop cap measurement failed after {} words: {}", count, err);
                break;
            }
        };
        if height > limit {
            break;
        }
        if height <= two_lines {
            within_two_lines = count + 1;
        }
        if height <= cap.cap_height {
            within_cap = count + 1;
        }
    }

    let words = if within_two_lines > 0 {
        within_two_lines
    } else {
        within_cap
    };
    if words == 0 {
        return CapSplit {
            beside: String::new(),
            below: markdown.trim_start().to_string(),
        };
    }
    if words == ends.len() {
        return CapSplit {
            beside: markdown.to_string(),
            below: String::new(),
        };
    }

    let split = walk_to_space(markdown, stripped.source_end(ends[words - 1]));
    let (beside, below) = balance_split(&markdown[..split], markdown[split..].trim_start());
    CapSplit { beside, below }
}

/// The letter set as a drop cap and the markdown without it
///
/// Returns `None` when the paragraph has no visible text.
pub fn take_cap_letter(markdown: &str) -> Option<(char, String)> {
    let stripped = strip_mapped(markdown);
    let (plain_start, letter) = stripped
        .text()
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())?;
    let src = stripped.source_start(plain_start)?;
    let mut rest = String::with_capacity(markdown.len());
    rest.push_str(&markdown[..src]);
    rest.push_str(&markdown[src + letter.len_utf8()..]);
    Some((letter, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::layout::font::{FontLibrary, FontMetrics};
    use crate::layout::measure::{MetricsMeasure, TextExtent};

    fn block_measure() -> MetricsMeasure {
        let mut fonts = FontLibrary::new();
        fonts.set("Block", FontMetrics::monospace(1.0));
        MetricsMeasure::new(fonts)
    }

    #[test]
    fn test_small_caps_four_words() {
        let split = split_for_small_caps("It was a bright cold day in April");
        assert_eq!(split.small_caps, "It was a bright");
        assert_eq!(split.rest, " cold day in April");
    }

    #[test]
    fn test_small_caps_stops_at_punctuation() {
        let split = split_for_small_caps("Yes, she said. Then more.");
        assert_eq!(split.small_caps, "Yes,");
        assert_eq!(split.rest, " she said. Then more.");
    }

    #[test]
    fn test_small_caps_keeps_contractions() {
        let split = split_for_small_caps("Don't look back now, Anna");
        assert_eq!(split.small_caps, "Don't look back now,");
    }

    #[test]
    fn test_small_caps_leading_quote() {
        let split = split_for_small_caps("\"Hello there,\" he said");
        assert_eq!(split.small_caps, "\"Hello there,");
    }

    #[test]
    fn test_small_caps_skips_markers() {
        let split = split_for_small_caps("*Hello,* world");
        assert_eq!(split.small_caps, "*Hello,*");
        assert_eq!(split.rest, " world");

        let split = split_for_small_caps("**One two three four five** six");
        assert_eq!(split.small_caps, "**One two three four**");
        assert_eq!(split.rest, " **five** six");
    }

    #[test]
    fn test_small_caps_short_paragraph() {
        let split = split_for_small_caps("Fin");
        assert_eq!(split.small_caps, "Fin");
        assert_eq!(split.rest, "");
        assert_eq!(split_for_small_caps("").small_caps, "");
    }

    fn cap_box(font: &FontSpec) -> DropCapBox<'_> {
        DropCapBox {
            width_beside: 50.0,
            cap_height: 20.0,
            font,
            size: 10.0,
            line_spacing: 1.0,
            using_small_caps: false,
        }
    }

    #[test]
    fn test_drop_cap_two_lines_beside() {
        let font = FontSpec::regular("Block");
        // Five chars per line beside the cap
        let split = split_for_drop_cap("abc de fgh ij klm no", &cap_box(&font), &block_measure());
        assert_eq!(split.beside, "abc de");
        assert_eq!(split.below, "fgh ij klm no");
    }

    #[test]
    fn test_drop_cap_keeps_formatting() {
        let font = FontSpec::regular("Block");
        let split = split_for_drop_cap("**abc de** fgh ij", &cap_box(&font), &block_measure());
        assert_eq!(split.beside, "**abc de**");
        assert_eq!(split.below, "fgh ij");

        let split = split_for_drop_cap("*abc de fgh* ij", &cap_box(&font), &block_measure());
        assert_eq!(split.beside, "*abc de*");
        assert_eq!(split.below, "*fgh* ij");
    }

    #[test]
    fn test_drop_cap_everything_fits() {
        let font = FontSpec::regular("Block");
        let split = split_for_drop_cap("ab cd", &cap_box(&font), &block_measure());
        assert_eq!(split.beside, "ab cd");
        assert!(split.below.is_empty());
    }

    #[test]
    fn test_drop_cap_small_caps_measured_wider() {
        let mut fonts = FontLibrary::new();
        fonts.set("Serif", FontMetrics::serif());
        let measure = MetricsMeasure::new(fonts);
        let font = FontSpec::regular("Serif");
        let text = "mmmm iiii mmmm iiii mmmm iiii mmmm iiii";
        let mut cap = DropCapBox {
            width_beside: 60.0,
            ..cap_box(&font)
        };
        let plain = split_for_drop_cap(text, &cap, &measure);
        cap.using_small_caps = true;
        let caps = split_for_drop_cap(text, &cap, &measure);
        assert!(caps.beside.len() <= plain.beside.len());
    }

    struct Broken;

    impl TextMeasure for Broken {
        fn measure(
            &self,
            _text: &str,
            _font: &FontSpec,
            _size: f32,
            _line_spacing: f32,
            max_width: f32,
        ) -> Result<TextExtent, MeasureError> {
            Err(MeasureError::InvalidWidth(max_width))
        }
    }

    #[test]
    fn test_drop_cap_measure_failure_puts_all_below() {
        let font = FontSpec::regular("Block");
        let split = split_for_drop_cap("some words here", &cap_box(&font), &Broken);
        assert!(split.beside.is_empty());
        assert_eq!(split.below, "some words here");
    }

    #[test]
    fn test_take_cap_letter() {
        assert_eq!(
            take_cap_letter("**Once** upon"),
            Some(('O', "**nce** upon".to_string()))
        );
        assert_eq!(take_cap_letter("  "), None);
    }
}
