//! Greedy page fitting
//!
//! [`compose_page`] fills one page of a chapter: title, subtitle, then as many
//! paragraphs as fit, splitting the last one at a word boundary. The returned
//! [`PaginationState`] is fed into the next call.

use crate::document::{Chapter, Paragraphs};
use crate::error::LayoutError;
use crate::layout::column::Column;
use crate::layout::measure::TextMeasure;
use crate::theme::{Theme, POINTS_PER_INCH};
use log::{debug, trace};
use serde::Serialize;
use smallvec::SmallVec;

/// Height kept free for bottom page numbers, in points
pub const FOOTER_RESERVE: f32 = 22.0;

/// Progress through a chapter between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub paragraph_index: usize,
    pub title_rendered: bool,
    pub subtitle_rendered: bool,
    /// Byte offset into the current paragraph, always on a char boundary
    pub character_offset: usize,
}

/// What a fragment renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FragmentKind {
    Title,
    Subtitle,
    /// The whole remainder of a paragraph
    Paragraph,
    /// A prefix of a paragraph cut at a word boundary
    Chunk,
}

/// A piece of chapter content placed on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub kind: FragmentKind,
    /// Markdown source
    pub text: String,
    pub indent: bool,
    /// Source paragraph; `None` for headings
    pub paragraph_index: Option<usize>,
    /// Byte offset in the source paragraph where `text` starts
    pub run_offset: usize,
}

impl Fragment {
    pub fn title(text: &str) -> Self {
        Self::heading(FragmentKind::Title, text)
    }

    pub fn subtitle(text: &str) -> Self {
        Self::heading(FragmentKind::Subtitle, text)
    }

    fn heading(kind: FragmentKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            indent: false,
            paragraph_index: None,
            run_offset: 0,
        }
    }

    pub fn body(
        kind: FragmentKind,
        text: &str,
        indent: bool,
        paragraph_index: usize,
        run_offset: usize,
    ) -> Self {
        Self {
            kind,
            text: text.to_string(),
            indent,
            paragraph_index: Some(paragraph_index),
            run_offset,
        }
    }

    pub fn is_body(&self) -> bool {
        matches!(self.kind, FragmentKind::Paragraph | FragmentKind::Chunk)
    }

    /// The very first run of the chapter's text
    pub fn is_chapter_opening(&self) -> bool {
        self.is_body() && self.paragraph_index == Some(0) && self.run_offset == 0
    }
}

/// Where a page goes and how much room it has
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlot {
    /// Physical page number, starting at 1
    pub page_number: u32,
    /// Full page width in points; margins are taken from it
    pub available_width: f32,
    /// Height between top and bottom margins in points
    pub available_height: f32,
    pub show_page_numbers: bool,
}

impl PageSlot {
    pub fn for_theme(theme: &Theme, page_number: u32, show_page_numbers: bool) -> Self {
        let (width, _) = theme.page_size();
        Self {
            page_number,
            available_width: width,
            available_height: theme.content_height(),
            show_page_numbers,
        }
    }
}

/// Resolved box of a composed page, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_width: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    /// Height the column was allowed to fill
    pub available_height: f32,
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }
}

/// Result of composing one page
#[derive(Debug, Clone)]
pub struct ComposedPage {
    pub page_number: u32,
    pub fragments: SmallVec<[Fragment; 8]>,
    pub state: PaginationState,
    pub has_more_content: bool,
    pub geometry: PageGeometry,
    pub show_page_numbers: bool,
}

impl ComposedPage {
    pub fn has_title(&self) -> bool {
        self.fragments.iter().any(|f| f.kind == FragmentKind::Title)
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Whitespace a line may break at
fn is_break_space(c: char) -> bool {
    c.is_whitespace() && c != '\u{00A0}'
}

/// Skip whitespace after a cut
fn skip_whitespace(paragraph: &str, mut offset: usize) -> usize {
    while let Some(c) = paragraph[offset..].chars().next() {
        if !c.is_whitespace() {
            break;
        }
        offset += c.len_utf8();
    }
    offset
}

/// Word-boundary cut points of a paragraph remainder
struct Cuts {
    /// Char index and byte offset of every breakable space after the first char
    spaces: Vec<(usize, usize)>,
    char_count: usize,
}

impl Cuts {
    fn new(text: &str) -> Self {
        let mut spaces = Vec::new();
        let mut char_count = 0;
        for (i, (byte, c)) in text.char_indices().enumerate() {
            if i >= 1 && is_break_space(c) {
                spaces.push((i, byte));
            }
            char_count += 1;
        }
        Self { spaces, char_count }
    }

    /// Byte offset of the last space at or before char index `len`
    fn snap(&self, len: usize) -> Option<usize> {
        let idx = self.spaces.partition_point(|&(i, _)| i <= len);
        idx.checked_sub(1).map(|i| self.spaces[i].1)
    }

    fn first_word_end(&self, text: &str) -> usize {
        self.spaces.first().map_or(text.len(), |&(_, byte)| byte)
    }
}

/// Fill one page of `chapter`, starting from `state`
pub fn compose_page<M: TextMeasure + ?Sized>(
    chapter: &Chapter,
    paragraphs: &Paragraphs,
    theme: &Theme,
    slot: PageSlot,
    state: PaginationState,
    measure: &M,
) -> Result<ComposedPage, LayoutError> {
    let mut state = state;
    let (margin_left, margin_right) = theme.margins_for_page(slot.page_number);
    let content_width = slot.available_width - margin_left - margin_right;

    let will_have_title = !state.title_rendered && !is_blank(&chapter.title);
    let mut available = slot.available_height;
    if slot.show_page_numbers && theme.page_number_position.is_bottom() && !will_have_title {
        available -= FOOTER_RESERVE;
    }

    let mut column = Column::new(theme, measure, content_width, slot.show_page_numbers);
    let mut fragments: SmallVec<[Fragment; 8]> = SmallVec::new();
    let mut current = 0.0;
    let mut remaining = available;

    // A title is never split or dropped
    if !state.title_rendered {
        if !is_blank(&chapter.title) {
            let candidate = Fragment::title(&chapter.title);
            let after = column.height_with(&fragments, &candidate)?;
            fragments.push(candidate);
            current = after;
            remaining = if after <= available { available - after } else { -1.0 };
        }
        state.title_rendered = true;
    }

    let mut page_closed = false;
    if !state.subtitle_rendered {
        if !is_blank(&chapter.subtitle) {
            let candidate = Fragment::subtitle(&chapter.subtitle);
            let after = column.height_with(&fragments, &candidate)?;
            let increment = after - current;
            if increment <= remaining || fragments.is_empty() {
                fragments.push(candidate);
                current = after;
                remaining -= increment;
                state.subtitle_rendered = true;
            } else {
                // Body text never precedes a pending subtitle
                page_closed = true;
            }
        } else {
            state.subtitle_rendered = true;
        }
    }

    while !page_closed && state.paragraph_index < paragraphs.len() {
        let index = state.paragraph_index;
        let paragraph = &paragraphs[index];
        let offset = state.character_offset;
        let full = &paragraph[offset..];

        if is_blank(full) {
            state.paragraph_index += 1;
            state.character_offset = 0;
            continue;
        }

        let indent = index > 0 && offset == 0 && chapter.flags.allows_indent();

        let whole = Fragment::body(FragmentKind::Paragraph, full, indent, index, offset);
        let after = column.height_with(&fragments, &whole)?;
        if after - current <= remaining {
            fragments.push(whole);
            remaining -= after - current;
            current = after;
            state.paragraph_index += 1;
            state.character_offset = 0;
            continue;
        }

        // Largest word-aligned prefix that fits
        let cuts = Cuts::new(full);
        let mut low = 1;
        let mut high = cuts.char_count;
        let mut best: Option<(usize, Fragment, f32)> = None;
        while low <= high {
            let mid = (low + high) / 2;
            let Some(cut) = cuts.snap(mid) else {
                low = mid + 1;
                continue;
            };
            let text = full[..cut].trim_end();
            let candidate = Fragment::body(FragmentKind::Chunk, text, indent, index, offset);
            let after = column.height_with(&fragments, &candidate)?;
            let fits = after - current <= remaining;
            trace!(
                "page {} paragraph {} probe {} chars (cut {}): {}",
                slot.page_number,
                index,
                mid,
                cut,
                if fits { "fits" } else { "overflows" }
            );
            if fits {
                best = Some((cut, candidate, after));
                low = mid + 1;
            } else {
                high = mid - 1;
            }
        }

        if let Some((cut, chunk, after)) = best {
            fragments.push(chunk);
            current = after;
            advance(&mut state, paragraph, offset + cut);
            break;
        }

        if !fragments.is_empty() {
            break;
        }

        // Nothing fits on an empty page: force the first word
        let word_end = cuts.first_word_end(full);
        let kind = if word_end == full.len() {
            FragmentKind::Paragraph
        } else {
            FragmentKind::Chunk
        };
        let word = Fragment::body(kind, &full[..word_end], indent, index, offset);
        current = column.height_with(&fragments, &word)?;
        fragments.push(word);
        advance(&mut state, paragraph, offset + word_end);
        break;
    }

    let has_more_content = state.paragraph_index < paragraphs.len();
    debug!(
        "composed page {}: {} fragments, {:.1}pt of {:.1}pt, state {:?}",
        slot.page_number,
        fragments.len(),
        current,
        available,
        state
    );

    Ok(ComposedPage {
        page_number: slot.page_number,
        fragments,
        state,
        has_more_content,
        geometry: PageGeometry {
            page_width: slot.available_width,
            margin_left,
            margin_right,
            margin_top: theme.top_margin * POINTS_PER_INCH,
            available_height: available,
        },
        show_page_numbers: slot.show_page_numbers,
    })
}

/// Move past a cut and the whitespace after it
fn advance(state: &mut PaginationState, paragraph: &str, cut: usize) {
    let offset = skip_whitespace(paragraph, cut);
    if offset >= paragraph.len() {
        state.paragraph_index += 1;
        state.character_offset = 0;
    } else {
        state.character_offset = offset;
    }
}
