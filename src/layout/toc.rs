//! Table-of-contents generation
//!
//! A generated entry is one paragraph of the form
//! `"{n}. {title}[: {subtitle}]|||{page}"`; entries are separated by blank
//! lines so each one segments into its own paragraph.

use crate::document::Project;
use crate::layout::engine::ChapterStartPages;

/// Separates an entry's title from its page number
pub const TOC_SEPARATOR: &str = "|||";

/// Body of the table of contents during the first generation pass
pub const TOC_PLACEHOLDER: &str = "Generating table of contents...";

/// Build the table-of-contents body from recorded start pages
///
/// Excluded and table-of-contents chapters are skipped and do not take a
/// number. Chapters with no recorded start page are left out.
///
/// Entries carry the number printed on the chapter's first page, that is the
/// physical page plus `page_offset`, not the physical page. Front matter
/// excluded from the count therefore does not push the listed numbers up.
pub fn table_of_contents(
    project: &Project,
    start_pages: &ChapterStartPages,
    page_offset: i32,
    show_subtitles: bool,
) -> String {
    let mut lines = Vec::new();
    let mut number = 0;

    for (id, chapter) in project.chapters() {
        if chapter.flags.is_table_of_contents || chapter.flags.exclude_from_page_count {
            continue;
        }
        number += 1;

        let Some(page) = start_pages.get(id) else {
            continue;
        };
        let mut line = format!("{}. {}", number, chapter.title);
        if show_subtitles && !chapter.subtitle.trim().is_empty() {
            line.push_str(": ");
            line.push_str(&chapter.subtitle);
        }
        line.push_str(TOC_SEPARATOR);
        line.push_str(&(i64::from(page) + i64::from(page_offset)).to_string());
        lines.push(line);
    }

    lines.join("\n\n")
}

/// Split an entry into its title and page number
pub fn parse_toc_line(text: &str) -> Option<(&str, &str)> {
    let (title, page) = text.split_once(TOC_SEPARATOR)?;
    Some((title.trim(), page.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Chapter, ChapterFlags, ChapterId};
    use crate::layout::engine::PageObserver;

    fn project() -> Project {
        let front = ChapterFlags {
            exclude_from_page_count: true,
            ..ChapterFlags::default()
        };
        let toc = ChapterFlags {
            is_table_of_contents: true,
            ..ChapterFlags::default()
        };
        Project {
            chapters: vec![
                Chapter::new("Dedication", "For M.").with_flags(front),
                Chapter::new("Contents", "").with_flags(toc),
                Chapter::new("Arrival", "...").with_subtitle("Rain"),
                Chapter::new("Departure", "..."),
            ],
            ..Project::default()
        }
    }

    #[test]
    fn test_entries_skip_front_matter() {
        let mut pages = ChapterStartPages::default();
        pages.on_first_page(ChapterId(0), 1);
        pages.on_first_page(ChapterId(1), 2);
        pages.on_first_page(ChapterId(2), 3);
        pages.on_first_page(ChapterId(3), 7);

        let toc = table_of_contents(&project(), &pages, -1, false);
        assert_eq!(toc, "1. Arrival|||2\n\n2. Departure|||6");

        let toc = table_of_contents(&project(), &pages, 0, true);
        assert_eq!(toc, "1. Arrival: Rain|||3\n\n2. Departure|||7");
    }

    #[test]
    fn test_missing_pages_are_skipped() {
        let mut pages = ChapterStartPages::default();
        pages.on_first_page(ChapterId(3), 5);
        assert_eq!(table_of_contents(&project(), &pages, 0, false), "2. Departure|||5");
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_toc_line("1. Arrival|||3"), Some(("1. Arrival", "3")));
        assert_eq!(parse_toc_line("no separator"), None);
    }
}
