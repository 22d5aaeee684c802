//! Inline markdown handling
//!
//! Two views of the same fragment:
//! - [`strip`] produces the plain text used for measurement, with a map back
//!   into the source so split points can be carried over to the markdown.
//! - [`parse_inlines`] produces styled runs for the final render, using
//!   pulldown-cmark for emphasis and strikethrough.
//!
//! The stripper only removes paired `**`, `__`, `*`, `_` and `++` markers.
//! `~~` is left in place, so measured strikethrough text is slightly wider
//! than the rendered text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
struct Mapped {
    ch: char,
    /// Byte offset of `ch` in the source markdown
    src: usize,
}

/// Plain text of a markdown fragment plus its mapping back to the source
#[derive(Debug, Clone)]
pub struct StrippedText {
    text: String,
    chars: Vec<Mapped>,
    /// Byte offset in `text` where each entry of `chars` starts
    plain_starts: Vec<usize>,
}

impl StrippedText {
    fn from_mapped(chars: Vec<Mapped>) -> Self {
        let mut text = String::with_capacity(chars.len());
        let mut plain_starts = Vec::with_capacity(chars.len());
        for m in &chars {
            plain_starts.push(text.len());
            text.push(m.ch);
        }
        Self {
            text,
            chars,
            plain_starts,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Source byte offset of the plain char starting at `plain_start`
    pub fn source_start(&self, plain_start: usize) -> Option<usize> {
        let idx = self.plain_starts.binary_search(&plain_start).ok()?;
        Some(self.chars[idx].src)
    }

    /// Source byte offset just past the plain text ending at `plain_end`
    pub fn source_end(&self, plain_end: usize) -> usize {
        let idx = self.plain_starts.partition_point(|&s| s < plain_end);
        match idx.checked_sub(1).and_then(|i| self.chars.get(i)) {
            Some(m) => m.src + m.ch.len_utf8(),
            None => 0,
        }
    }
}

fn is_double(chars: &[Mapped], i: usize, marker: char) -> bool {
    i + 1 < chars.len() && chars[i].ch == marker && chars[i + 1].ch == marker
}

/// Remove `mm…mm` pairs: shortest non-empty content, never across a newline
fn strip_double(chars: &[Mapped], marker: char) -> Vec<Mapped> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if is_double(chars, i, marker) {
            let start = i + 2;
            let mut close = None;
            for j in start..chars.len() {
                if j > start && is_double(chars, j, marker) {
                    close = Some(j);
                    break;
                }
                if chars[j].ch == '\n' {
                    break;
                }
            }
            if let Some(j) = close {
                out.extend_from_slice(&chars[start..j]);
                i = j + 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// A lone marker: not preceded or followed by the same character
fn is_single(chars: &[Mapped], i: usize, marker: char) -> bool {
    chars[i].ch == marker
        && (i == 0 || chars[i - 1].ch != marker)
        && chars.get(i + 1).map_or(true, |m| m.ch != marker)
}

/// Remove `m…m` pairs without touching doubled markers
fn strip_single(chars: &[Mapped], marker: char) -> Vec<Mapped> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if is_single(chars, i, marker) && i + 1 < chars.len() {
            let start = i + 1;
            let mut close = None;
            for j in start..chars.len() {
                if j > start && is_single(chars, j, marker) {
                    close = Some(j);
                    break;
                }
                if chars[j].ch == '\n' {
                    break;
                }
            }
            if let Some(j) = close {
                out.extend_from_slice(&chars[start..j]);
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Strip emphasis markers, keeping a map back into the source
pub fn strip_mapped(markdown: &str) -> StrippedText {
    let chars: Vec<Mapped> = markdown
        .char_indices()
        .map(|(src, ch)| Mapped { ch, src })
        .collect();

    let chars = strip_double(&chars, '*');
    let chars = strip_double(&chars, '_');
    let chars = strip_single(&chars, '*');
    let chars = strip_single(&chars, '_');
    let chars = strip_double(&chars, '+');

    StrippedText::from_mapped(chars)
}

/// Plain text for measurement
pub fn strip(markdown: &str) -> String {
    strip_mapped(markdown).into_text()
}

/// A run of uniformly styled text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub line_break_after: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    underline: bool,
    strikethrough: bool,
}

const UNDERLINE: &str = "++";

/// Collects parser events into styled runs
struct RunBuilder {
    runs: Vec<StyledRun>,
    buffer: String,
    buffer_style: InlineStyle,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    underline: bool,
    /// `++` markers that still have a partner
    underline_markers: usize,
}

impl RunBuilder {
    fn new(underline_markers: usize) -> Self {
        Self {
            runs: Vec::new(),
            buffer: String::new(),
            buffer_style: InlineStyle::default(),
            strong: 0,
            emphasis: 0,
            strikethrough: 0,
            underline: false,
            underline_markers,
        }
    }

    fn style(&self) -> InlineStyle {
        InlineStyle {
            bold: self.strong > 0,
            italic: self.emphasis > 0,
            underline: self.underline,
            strikethrough: self.strikethrough > 0,
        }
    }

    fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let style = self.style();
        if style != self.buffer_style && !self.buffer.is_empty() {
            self.flush(false);
        }
        self.buffer_style = style;
        self.buffer.push_str(text);
    }

    /// Text with `++` pairs toggling underline
    fn text(&mut self, text: &str) {
        let mut rest = text;
        while self.underline_markers > 0 {
            let Some(pos) = rest.find(UNDERLINE) else {
                break;
            };
            self.push_str(&rest[..pos]);
            self.underline = !self.underline;
            self.underline_markers -= 1;
            rest = &rest[pos + UNDERLINE.len()..];
        }
        self.push_str(rest);
    }

    fn flush(&mut self, line_break_after: bool) {
        if self.buffer.is_empty() && !line_break_after {
            return;
        }
        let style = self.buffer_style;
        self.runs.push(StyledRun {
            text: std::mem::take(&mut self.buffer),
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            strikethrough: style.strikethrough,
            line_break_after,
        });
    }

    fn line_break(&mut self) {
        let trimmed = self.buffer.trim_end_matches(' ').len();
        self.buffer.truncate(trimmed);
        self.flush(true);
    }

    fn has_content(&self) -> bool {
        !self.buffer.is_empty() || !self.runs.is_empty()
    }

    /// Keep the source marker of a block construct as plain text
    fn block_start(&mut self, marker: &str) {
        if self.has_content() {
            self.line_break();
        }
        self.push_str(marker);
    }

    fn event(&mut self, event: Event<'_>, source: &str) {
        match event {
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                self.strikethrough = self.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::Item) => self.block_start(item_marker(source)),
            Event::Start(Tag::Heading { .. }) => {
                self.block_start(leading_marker(source, '#'))
            }
            Event::Start(Tag::BlockQuote(_)) => self.block_start(leading_marker(source, '>')),
            // A scene break such as `* * *` is text in a book
            Event::Rule => self.block_start(source.trim_end()),
            Event::Text(text) | Event::Code(text) => self.text(&text),
            Event::InlineHtml(html) | Event::Html(html) => self.push_str(&html),
            // Soft breaks render as hard breaks
            Event::SoftBreak | Event::HardBreak => self.line_break(),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<StyledRun> {
        self.flush(false);
        self.runs
    }
}

/// Paired `++` markers in the text events of `markdown`
fn underline_markers(markdown: &str) -> usize {
    let count: usize = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Text(text) | Event::Code(text) => text.matches(UNDERLINE).count(),
            _ => 0,
        })
        .sum();
    count - count % 2
}

fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// `marker` repeated at the start of `source`, with the spaces after it
fn leading_marker(source: &str, marker: char) -> &str {
    let rest = source.trim_start_matches(marker);
    let rest = rest.trim_start_matches(is_inline_space);
    &source[..source.len() - rest.len()]
}

/// List item marker such as `- ` or `12. `
fn item_marker(source: &str) -> &str {
    let token = source.find(char::is_whitespace).unwrap_or(source.len());
    let rest = source[token..].trim_start_matches(is_inline_space);
    &source[..source.len() - rest.len()]
}

/// Render inline markdown into styled runs
///
/// Leading and trailing spaces are kept as plain text so split halves can be
/// set side by side.
pub fn parse_inlines(markdown: &str) -> Vec<StyledRun> {
    let body = markdown.trim_matches(is_inline_space);
    let lead_len = markdown.len() - markdown.trim_start_matches(is_inline_space).len();
    let lead = &markdown[..lead_len];
    let trail = if body.is_empty() {
        ""
    } else {
        &markdown[lead_len + body.len()..]
    };

    let mut builder = RunBuilder::new(underline_markers(body));
    builder.push_str(lead);
    for (event, range) in Parser::new_ext(body, Options::ENABLE_STRIKETHROUGH).into_offset_iter() {
        builder.event(event, &body[range]);
    }
    builder.underline = false;
    builder.strong = 0;
    builder.emphasis = 0;
    builder.strikethrough = 0;
    builder.push_str(trail);
    builder.finish()
}

/// Concatenated text of runs, line breaks as `\n`
pub fn runs_text(runs: &[StyledRun]) -> String {
    let mut out = String::new();
    for run in runs {
        out.push_str(&run.text);
        if run.line_break_after {
            out.push('\n');
        }
    }
    out
}

const DOUBLE_MARKERS: [&str; 4] = ["**", "__", "++", "~~"];

/// Markers opened in `text` and not yet closed, outermost first
///
/// A marker closes when it matches the innermost open one and follows text;
/// it opens when text follows it. Underscores inside words are literal.
fn open_markers(text: &str) -> Vec<&'static str> {
    let chars: Vec<char> = text.chars().collect();
    let mut stack: Vec<&'static str> = Vec::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        let marker = if chars.get(i + 1) == Some(&c) {
            DOUBLE_MARKERS.iter().copied().find(|m| m.starts_with(c))
        } else {
            match c {
                '*' => Some("*"),
                '_' => Some("_"),
                _ => None,
            }
        };
        let Some(marker) = marker else {
            i += 1;
            continue;
        };

        let len = marker.len();
        let before = i.checked_sub(1).map(|j| chars[j]);
        let after = chars.get(i + len).copied();
        let follows_text = before.is_some_and(|b| !b.is_whitespace());
        let precedes_text = after.is_some_and(|a| !a.is_whitespace());
        let intraword = c == '_'
            && before.is_some_and(char::is_alphanumeric)
            && after.is_some_and(char::is_alphanumeric);

        if !intraword {
            if stack.last() == Some(&marker) && follows_text {
                stack.pop();
            } else if precedes_text {
                stack.push(marker);
            }
        }
        i += len;
    }
    stack
}

/// Close emphasis left open at a split and reopen it in the second half
pub fn balance_split(first: &str, second: &str) -> (String, String) {
    let open = open_markers(first);
    if open.is_empty() {
        return (first.to_string(), second.to_string());
    }

    let mut head = first.to_string();
    for marker in open.iter().rev() {
        head.push_str(marker);
    }

    let body = second.trim_start();
    let lead = &second[..second.len() - body.len()];
    let mut tail = String::with_capacity(second.len() + 4);
    tail.push_str(lead);
    for marker in &open {
        tail.push_str(marker);
    }
    tail.push_str(body);

    (head, tail)
}

/// Markdown for one piece of a paragraph split across pages
///
/// Emphasis still open in `before` is reopened at the start of `piece`. With
/// `close` set, emphasis left open at the end of the piece is closed.
pub fn continue_emphasis(before: &str, piece: &str, close: bool) -> String {
    let mut out = String::with_capacity(piece.len() + 8);
    for marker in open_markers(before) {
        out.push_str(marker);
    }
    out.push_str(piece);
    if close {
        for marker in open_markers(&out).iter().rev() {
            out.push_str(marker);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(strip("**bold** and __strong__"), "bold and strong");
        assert_eq!(strip("*it* and _em_ here"), "it and em here");
        assert_eq!(strip("++under++ line"), "under line");
        assert_eq!(strip("plain text"), "plain text");
    }

    #[test]
    fn test_strip_keeps_strikethrough() {
        assert_eq!(strip("~~gone~~ **kept**"), "~~gone~~ kept");
    }

    #[test]
    fn test_strip_does_not_cross_newlines() {
        assert_eq!(strip("**open\nclose**"), "**open\nclose**");
    }

    #[test]
    fn test_strip_preserves_whitespace() {
        assert_eq!(strip("a  **b**   c"), "a  b   c");
    }

    #[test]
    fn test_strip_unpaired_markers_stay() {
        assert_eq!(strip("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(strip("****"), "****");
    }

    #[test]
    fn test_source_end_maps_back() {
        let md = "The **quick** fox";
        let stripped = strip_mapped(md);
        assert_eq!(stripped.text(), "The quick fox");
        // "The quick" ends at plain byte 9, which is just before the closing "**"
        assert_eq!(stripped.source_end(9), 11);
        assert_eq!(&md[..stripped.source_end(9)], "The **quick");
        assert_eq!(stripped.source_end(0), 0);
        assert_eq!(stripped.source_start(4), Some(6));
        assert_eq!(stripped.source_start(5), Some(7));
    }

    #[test]
    fn test_parse_plain() {
        let runs = parse_inlines("Hello world");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello world");
        assert!(!runs[0].bold);
    }

    #[test]
    fn test_parse_emphasis_kinds() {
        let runs = parse_inlines("a **b** *c* ++d++ ~~e~~ __f__ _g_");
        let styled: Vec<_> = runs
            .iter()
            .filter(|r| r.text.trim().len() == 1)
            .map(|r| (r.text.as_str(), r.bold, r.italic, r.underline, r.strikethrough))
            .collect();
        assert_eq!(
            styled,
            vec![
                ("a", false, false, false, false),
                ("b", true, false, false, false),
                ("c", false, true, false, false),
                ("d", false, false, true, false),
                ("e", false, false, false, true),
                ("f", true, false, false, false),
                ("g", false, true, false, false),
            ]
        );
    }

    #[test]
    fn test_parse_nested() {
        let runs = parse_inlines("***both***");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].bold && runs[0].italic);
        assert_eq!(runs[0].text, "both");

        let runs = parse_inlines("*an **inner** word*");
        assert_eq!(runs_text(&runs), "an inner word");
        assert!(runs.iter().all(|r| r.italic));
        assert!(runs.iter().any(|r| r.bold && r.text == "inner"));
    }

    #[test]
    fn test_soft_break_is_hard() {
        let runs = parse_inlines("line one\nline two");
        assert_eq!(runs.len(), 2);
        assert!(runs[0].line_break_after);
        assert_eq!(runs[0].text, "line one");
        assert_eq!(runs[1].text, "line two");
    }

    #[test]
    fn test_escapes_and_snake_case() {
        assert_eq!(runs_text(&parse_inlines(r"\*not italic\*")), "*not italic*");
        let runs = parse_inlines("snake_case_name stays");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "snake_case_name stays");
    }

    #[test]
    fn test_unclosed_marker_is_literal() {
        let runs = parse_inlines("**never closed");
        assert_eq!(runs_text(&runs), "**never closed");
        assert!(!runs[0].bold);
    }

    #[test]
    fn test_unmatched_emphasis_follows_commonmark() {
        let runs = parse_inlines("**foo*");
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].text.as_str(), runs[0].italic), ("*", false));
        assert_eq!((runs[1].text.as_str(), runs[1].italic), ("foo", true));
    }

    #[test]
    fn test_unpaired_underline_is_literal() {
        let runs = parse_inlines("a ++b++ c++ d");
        assert_eq!(runs_text(&runs), "a b c++ d");
        assert!(runs.iter().any(|r| r.underline && r.text == "b"));
        assert!(runs.iter().all(|r| !r.underline || r.text == "b"));
    }

    #[test]
    fn test_block_markers_stay_as_text() {
        assert_eq!(runs_text(&parse_inlines("- Who goes there?")), "- Who goes there?");
        assert_eq!(runs_text(&parse_inlines("1984. A year.")), "1984. A year.");
        assert_eq!(runs_text(&parse_inlines("* * *")), "* * *");
        assert_eq!(runs_text(&parse_inlines("> quoted")), "> quoted");
    }

    #[test]
    fn test_outer_spaces_kept() {
        let runs = parse_inlines(" cold *day* ");
        assert_eq!(runs_text(&runs), " cold day ");
        assert_eq!(runs[0].text, " cold ");
    }

    #[test]
    fn test_continue_emphasis() {
        let paragraph = "**one two three four**";
        assert_eq!(continue_emphasis("", "**one two", true), "**one two**");
        assert_eq!(continue_emphasis(&paragraph[..10], "three four**", false), "**three four**");
        assert_eq!(continue_emphasis("plain ", "text", true), "text");
        // Literal asterisks are not emphasis
        assert_eq!(continue_emphasis("2 * 3 ", "is six", true), "is six");
    }

    #[test]
    fn test_balance_split() {
        let (a, b) = balance_split("He said **hello", " world** again");
        assert_eq!(a, "He said **hello**");
        assert_eq!(b, " **world** again");

        let (a, b) = balance_split("plain", "text");
        assert_eq!((a.as_str(), b.as_str()), ("plain", "text"));

        let (a, b) = balance_split("*one **two", "three** four*");
        assert_eq!(a, "*one **two***");
        assert_eq!(b, "***three** four*");
    }
}
