//! Display list: positioned, render-ready page content
//!
//! [`PageRenderer`] turns a composed page into absolute items. All
//! coordinates are points from the top-left corner of the page.

use crate::document::markdown::{continue_emphasis, parse_inlines, runs_text, strip, StyledRun};
use crate::document::{Chapter, ChapterId, Paragraphs, Project};
use crate::layout::column::{indent_prefix, Column};
use crate::layout::drop_cap::{split_for_drop_cap, split_for_small_caps, take_cap_letter, DropCapBox};
use crate::layout::engine::PlacedPage;
use crate::layout::font::FontSpec;
use crate::layout::measure::TextMeasure;
use crate::layout::pagination::{ComposedPage, Fragment, FragmentKind, FOOTER_RESERVE};
use crate::layout::toc::{parse_toc_line, TOC_SEPARATOR};
use crate::theme::{HeaderContent, PageNumberPosition, TextAlignment, Theme, POINTS_PER_INCH};
use crate::Rect;
use log::warn;
use serde::Serialize;

/// Space between a drop cap and the text beside it, in points
pub const DROP_CAP_GAP: f32 = 4.0;

/// Chapter title or subtitle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeadingLevel {
    Title,
    Subtitle,
}

/// A display item to render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DisplayItem {
    Heading {
        level: HeadingLevel,
        rect: Rect,
        text: String,
        font: String,
        size: f32,
        bold: bool,
        italic: bool,
        alignment: TextAlignment,
    },
    /// Justified body text
    TextBlock {
        rect: Rect,
        /// Runs set in small caps, before `spans`
        lead_in: Vec<StyledRun>,
        spans: Vec<StyledRun>,
        font: String,
        size: f32,
        line_spacing: f32,
    },
    DropCap {
        rect: Rect,
        letter: char,
        font: String,
        size: f32,
    },
    /// Table-of-contents entry: title on the left, page number on the right
    TocRow {
        rect: Rect,
        title: String,
        page: String,
    },
    PageNumber {
        rect: Rect,
        text: String,
        alignment: TextAlignment,
    },
    RunningHeader {
        rect: Rect,
        text: String,
    },
}

impl DisplayItem {
    pub fn rect(&self) -> Rect {
        match self {
            DisplayItem::Heading { rect, .. }
            | DisplayItem::TextBlock { rect, .. }
            | DisplayItem::DropCap { rect, .. }
            | DisplayItem::TocRow { rect, .. }
            | DisplayItem::PageNumber { rect, .. }
            | DisplayItem::RunningHeader { rect, .. } => *rect,
        }
    }

    /// Plain text of the item
    pub fn text(&self) -> String {
        match self {
            DisplayItem::Heading { text, .. }
            | DisplayItem::PageNumber { text, .. }
            | DisplayItem::RunningHeader { text, .. } => text.clone(),
            DisplayItem::TextBlock { lead_in, spans, .. } => {
                let mut out = runs_text(lead_in).to_uppercase();
                out.push_str(&runs_text(spans));
                out
            }
            DisplayItem::DropCap { letter, .. } => letter.to_string(),
            DisplayItem::TocRow { title, page, .. } => format!("{} .... {}", title, page),
        }
    }
}

/// Display list for a single page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPage {
    /// Zero-based position in the book
    pub page_index: usize,
    /// Physical page number, starting at 1
    pub page_number: u32,
    /// Number printed on the page, when page numbers are shown
    pub display_number: Option<i64>,
    pub chapter: ChapterId,
    pub bounds: Rect,
    pub items: Vec<DisplayItem>,
}

impl DisplayPage {
    /// Text of the page, one item per line
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(self.items.len());
        let mut pending_cap: Option<char> = None;
        for item in &self.items {
            match item {
                DisplayItem::DropCap { letter, .. } => pending_cap = Some(*letter),
                _ => {
                    let mut text = item.text();
                    if let Some(letter) = pending_cap.take() {
                        text.insert(0, letter);
                    }
                    lines.push(text);
                }
            }
        }
        lines.join("\n")
    }
}

/// Final render pass over composed pages
pub struct PageRenderer<'a, M: TextMeasure + ?Sized> {
    theme: &'a Theme,
    measure: &'a M,
    project: &'a Project,
    body_font: FontSpec,
}

impl<'a, M: TextMeasure + ?Sized> PageRenderer<'a, M> {
    pub fn new(theme: &'a Theme, measure: &'a M, project: &'a Project) -> Self {
        Self {
            theme,
            measure,
            project,
            body_font: theme.body_font_spec(),
        }
    }

    pub fn render(
        &self,
        index: usize,
        chapter: &Chapter,
        placed: &PlacedPage,
        page_offset: i32,
    ) -> DisplayPage {
        let page = &placed.page;
        let geometry = page.geometry;
        let (page_width, page_height) = self.theme.page_size();
        let x = geometry.margin_left;
        let width = geometry.content_width();
        let has_title = page.has_title();
        let display_number = i64::from(page.page_number) + i64::from(page_offset);

        let mut column = Column::new(self.theme, self.measure, width, page.show_page_numbers);
        let paragraphs = chapter.paragraphs();
        let mut items = Vec::new();
        let mut y = geometry.margin_top + column.top_offset(has_title);

        let band = column.header_band(has_title);
        if band > 0.0 {
            self.top_band(&mut items, page, chapter, Rect::new(x, y, width, band), display_number);
            y += band;
        }

        for fragment in &page.fragments {
            let height = match column.block_height(fragment) {
                Ok(height) => height,
                Err(err) => {
                    warn!("page {}: using estimated height: {}", page.page_number, err);
                    self.theme.body_line_height() * 2.0
                }
            };
            let used = match fragment.kind {
                FragmentKind::Title | FragmentKind::Subtitle => {
                    items.push(self.heading(fragment, Rect::new(x, y, width, height)));
                    height
                }
                FragmentKind::Paragraph | FragmentKind::Chunk => {
                    let markdown = fragment_markdown(fragment, &paragraphs);
                    let rect = Rect::new(x, y, width, height);
                    self.body(&mut items, fragment, &markdown, chapter, rect)
                }
            };
            y += used.max(height);
        }

        if page.show_page_numbers && !has_title && self.theme.page_number_position.is_bottom() {
            let rect = Rect::new(
                x,
                geometry.margin_top + geometry.available_height,
                width,
                FOOTER_RESERVE,
            );
            let alignment = match self.theme.page_number_position {
                PageNumberPosition::BottomCentered => TextAlignment::Center,
                _ => outside_edge(page.page_number),
            };
            items.push(DisplayItem::PageNumber {
                rect,
                text: display_number.to_string(),
                alignment,
            });
        }

        DisplayPage {
            page_index: index,
            page_number: page.page_number,
            display_number: page.show_page_numbers.then_some(display_number),
            chapter: placed.chapter,
            bounds: Rect::new(0.0, 0.0, page_width, page_height),
            items,
        }
    }

    /// Page number on the outside edge, running header centred
    fn top_band(
        &self,
        items: &mut Vec<DisplayItem>,
        page: &ComposedPage,
        chapter: &Chapter,
        rect: Rect,
        display_number: i64,
    ) {
        let odd = page.page_number % 2 == 1;
        let (content, capitalize) = if odd {
            (self.theme.right_page_header, self.theme.right_page_header_capitalize)
        } else {
            (self.theme.left_page_header, self.theme.left_page_header_capitalize)
        };

        let header = match content {
            HeaderContent::None => "",
            HeaderContent::BookTitle => self.project.book_title.as_str(),
            HeaderContent::Author => self.project.author.as_str(),
            HeaderContent::ChapterTitle => chapter.title.as_str(),
        };
        if !header.trim().is_empty() {
            let text = if capitalize {
                header.to_uppercase()
            } else {
                header.to_string()
            };
            items.push(DisplayItem::RunningHeader { rect, text });
        }

        items.push(DisplayItem::PageNumber {
            rect,
            text: display_number.to_string(),
            alignment: outside_edge(page.page_number),
        });
    }

    fn heading(&self, fragment: &Fragment, rect: Rect) -> DisplayItem {
        let (level, style) = match fragment.kind {
            FragmentKind::Title => (HeadingLevel::Title, &self.theme.chapter_title),
            _ => (HeadingLevel::Subtitle, &self.theme.chapter_subtitle),
        };
        DisplayItem::Heading {
            level,
            rect: Rect {
                height: (rect.height - style.bottom_spacing * POINTS_PER_INCH).max(0.0),
                ..rect
            },
            text: fragment.text.clone(),
            font: style.font.clone(),
            size: style.size,
            bold: style.bold,
            italic: style.italic,
            alignment: style.alignment,
        }
    }

    /// Emit a paragraph or chunk; returns the height it takes
    fn body(
        &self,
        items: &mut Vec<DisplayItem>,
        fragment: &Fragment,
        markdown: &str,
        chapter: &Chapter,
        rect: Rect,
    ) -> f32 {
        if fragment.text.contains(TOC_SEPARATOR) {
            if let Some((title, page)) = parse_toc_line(&fragment.text) {
                items.push(DisplayItem::TocRow {
                    rect,
                    title: strip(title),
                    page: page.to_string(),
                });
                return rect.height;
            }
        }

        let ornamented = fragment.is_chapter_opening()
            && chapter.flags.allows_ornaments()
            && (self.theme.drop_caps || self.theme.lead_with_small_caps);
        if !ornamented {
            let mut spans = Vec::new();
            if fragment.indent {
                spans.push(StyledRun {
                    text: indent_prefix(self.theme),
                    ..StyledRun::default()
                });
            }
            spans.extend(parse_inlines(markdown));
            items.push(self.text_block(rect, Vec::new(), spans));
            return rect.height;
        }

        if !self.theme.drop_caps {
            let split = split_for_small_caps(markdown);
            items.push(self.text_block(
                rect,
                parse_inlines(&split.small_caps),
                parse_inlines(&split.rest),
            ));
            return rect.height;
        }

        self.drop_cap(items, markdown, rect)
    }

    fn drop_cap(&self, items: &mut Vec<DisplayItem>, markdown: &str, rect: Rect) -> f32 {
        let Some((letter, rest)) = take_cap_letter(markdown) else {
            items.push(self.text_block(rect, Vec::new(), parse_inlines(markdown)));
            return rect.height;
        };

        let size = self.theme.body_font_size;
        let line_spacing = self.theme.body_line_spacing();
        let cap_height = 2.0 * size * line_spacing;
        let cap_width = self
            .measure
            .measure(&letter.to_string(), &self.body_font, cap_height, 1.0, rect.width)
            .map(|extent| extent.width)
            .unwrap_or(cap_height * 0.7);

        items.push(DisplayItem::DropCap {
            rect: Rect::new(rect.x, rect.y, cap_width, cap_height),
            letter,
            font: self.theme.body_font.clone(),
            size: cap_height,
        });

        let beside_x = rect.x + cap_width + DROP_CAP_GAP;
        let beside_width = (rect.width - cap_width - DROP_CAP_GAP).max(1.0);
        let cap = DropCapBox {
            width_beside: beside_width,
            cap_height,
            font: &self.body_font,
            size,
            line_spacing,
            using_small_caps: self.theme.lead_with_small_caps,
        };
        let split = split_for_drop_cap(&rest, &cap, self.measure);

        let mut beside_height = 0.0;
        if !split.beside.is_empty() {
            beside_height = self.estimate_height(&split.beside, beside_width);
            let (lead_in, spans) = if self.theme.lead_with_small_caps {
                let lead = split_for_small_caps(&split.beside);
                (parse_inlines(&lead.small_caps), parse_inlines(&lead.rest))
            } else {
                (Vec::new(), parse_inlines(&split.beside))
            };
            items.push(self.text_block(
                Rect::new(beside_x, rect.y, beside_width, beside_height),
                lead_in,
                spans,
            ));
        }

        let mut used = beside_height.max(cap_height);
        if !split.below.is_empty() {
            let below_height = self.estimate_height(&split.below, rect.width);
            items.push(self.text_block(
                Rect::new(rect.x, rect.y + used, rect.width, below_height),
                Vec::new(),
                parse_inlines(&split.below),
            ));
            used += below_height;
        }
        used
    }

    /// Height of body text; two lines when measurement fails
    fn estimate_height(&self, markdown: &str, width: f32) -> f32 {
        match self.measure.measure(
            &strip(markdown),
            &self.body_font,
            self.theme.body_font_size,
            self.theme.body_line_spacing(),
            width,
        ) {
            Ok(extent) => extent.height,
            Err(err) => {
                warn!("estimating two lines for unmeasurable text: {}", err);
                self.theme.body_line_height() * 2.0
            }
        }
    }

    fn text_block(&self, rect: Rect, lead_in: Vec<StyledRun>, spans: Vec<StyledRun>) -> DisplayItem {
        DisplayItem::TextBlock {
            rect,
            lead_in,
            spans,
            font: self.theme.body_font.clone(),
            size: self.theme.body_font_size,
            line_spacing: self.theme.body_line_spacing(),
        }
    }
}

/// Markdown of a body fragment with emphasis carried across page cuts
fn fragment_markdown(fragment: &Fragment, paragraphs: &Paragraphs) -> String {
    let is_chunk = fragment.kind == FragmentKind::Chunk;
    if fragment.run_offset == 0 && !is_chunk {
        return fragment.text.clone();
    }
    let before = fragment
        .paragraph_index
        .and_then(|index| paragraphs.get(index))
        .and_then(|paragraph| paragraph.get(..fragment.run_offset))
        .unwrap_or("");
    continue_emphasis(before, &fragment.text, is_chunk)
}

/// Alignment that puts a page number on the outer edge of the spread
fn outside_edge(page_number: u32) -> TextAlignment {
    if page_number % 2 == 1 {
        TextAlignment::Right
    } else {
        TextAlignment::Left
    }
}
