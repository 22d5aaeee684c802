//! Multi-chapter driver
//!
//! Chapters are paginated strictly in order, each starting on a fresh page.
//! When the project has a table of contents, the whole book is paginated
//! twice: once with a placeholder to learn where chapters start, then again
//! with the real entries.

use crate::document::{Chapter, ChapterId, Paragraphs, Project};
use crate::error::LayoutError;
use crate::layout::measure::{MetricsMeasure, TextMeasure};
use crate::layout::pagination::{compose_page, ComposedPage, PageSlot, PaginationState};
use crate::layout::toc::{table_of_contents, TOC_PLACEHOLDER};
use crate::render::{DisplayPage, PageRenderer};
use crate::theme::Theme;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

/// Receives the first physical page of each chapter
pub trait PageObserver {
    fn on_first_page(&mut self, chapter: ChapterId, page_number: u32);
}

/// Chapter → first physical page number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterStartPages(FxHashMap<ChapterId, u32>);

impl ChapterStartPages {
    pub fn get(&self, chapter: ChapterId) -> Option<u32> {
        self.0.get(&chapter).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in chapter order
    pub fn sorted(&self) -> Vec<(ChapterId, u32)> {
        let mut entries: Vec<_> = self.0.iter().map(|(id, page)| (*id, *page)).collect();
        entries.sort_unstable();
        entries
    }
}

impl PageObserver for ChapterStartPages {
    fn on_first_page(&mut self, chapter: ChapterId, page_number: u32) {
        self.0.insert(chapter, page_number);
    }
}

/// Pages one chapter at a time
pub struct ChapterPaginator<'a, M: TextMeasure + ?Sized> {
    id: ChapterId,
    chapter: &'a Chapter,
    paragraphs: Paragraphs,
    theme: &'a Theme,
    measure: &'a M,
    state: PaginationState,
    show_page_numbers: bool,
    first_page_reported: bool,
    finished: bool,
}

impl<'a, M: TextMeasure + ?Sized> ChapterPaginator<'a, M> {
    pub fn new(id: ChapterId, chapter: &'a Chapter, theme: &'a Theme, measure: &'a M) -> Self {
        Self {
            id,
            chapter,
            paragraphs: chapter.paragraphs(),
            theme,
            measure,
            state: PaginationState::default(),
            show_page_numbers: !chapter.flags.exclude_from_page_count,
            first_page_reported: false,
            finished: false,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Compose the next page, or `None` once the chapter is done
    pub fn next_page(
        &mut self,
        page_number: u32,
        observer: &mut dyn PageObserver,
    ) -> Result<Option<ComposedPage>, LayoutError> {
        if self.finished {
            return Ok(None);
        }
        if !self.first_page_reported {
            observer.on_first_page(self.id, page_number);
            self.first_page_reported = true;
        }

        let slot = PageSlot::for_theme(self.theme, page_number, self.show_page_numbers);
        let page = compose_page(
            self.chapter,
            &self.paragraphs,
            self.theme,
            slot,
            self.state,
            self.measure,
        )?;

        if page.has_more_content && page.state == self.state {
            return Err(LayoutError::Stalled {
                chapter: self.id.0,
                page: page_number,
            });
        }

        self.state = page.state;
        self.finished = !page.has_more_content;
        Ok(Some(page))
    }
}

/// A composed page and the chapter it belongs to
#[derive(Debug, Clone)]
pub struct PlacedPage {
    pub chapter: ChapterId,
    pub page: ComposedPage,
}

/// Output of one pagination pass
#[derive(Debug, Clone)]
pub struct Pagination {
    pub pages: Vec<PlacedPage>,
    pub start_pages: ChapterStartPages,
    /// Added to physical page numbers to get printed ones
    pub page_offset: i32,
}

/// Finished book: rendered pages plus where each chapter starts
#[derive(Debug, Clone)]
pub struct RenderedBook {
    pages: Vec<DisplayPage>,
    start_pages: ChapterStartPages,
    page_offset: i32,
    table_of_contents: Option<String>,
}

impl RenderedBook {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[DisplayPage] {
        &self.pages
    }

    /// A page by zero-based index
    pub fn page(&self, index: usize) -> Result<&DisplayPage, LayoutError> {
        self.pages.get(index).ok_or(LayoutError::PageOutOfRange {
            index,
            count: self.pages.len(),
        })
    }

    pub fn chapter_start_pages(&self) -> &ChapterStartPages {
        &self.start_pages
    }

    pub fn page_offset(&self) -> i32 {
        self.page_offset
    }

    /// Generated table-of-contents body, if the project has one
    pub fn table_of_contents(&self) -> Option<&str> {
        self.table_of_contents.as_deref()
    }
}

/// Paginates and renders whole projects
pub struct LayoutEngine<M: TextMeasure = MetricsMeasure> {
    theme: Theme,
    measure: M,
}

impl LayoutEngine<MetricsMeasure> {
    pub fn new(theme: Theme) -> Self {
        Self::with_measure(theme, MetricsMeasure::default())
    }
}

impl<M: TextMeasure> LayoutEngine<M> {
    pub fn with_measure(theme: Theme, measure: M) -> Self {
        Self { theme, measure }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// One full pagination pass over the project
    pub fn paginate(&self, project: &Project) -> Result<Pagination, LayoutError> {
        let page_offset = -(project.leading_excluded_chapters() as i32);
        let mut pages = Vec::new();
        let mut start_pages = ChapterStartPages::default();
        let mut page_number = 1;

        for (id, chapter) in project.chapters() {
            let mut paginator = ChapterPaginator::new(id, chapter, &self.theme, &self.measure);
            while let Some(page) = paginator.next_page(page_number, &mut start_pages)? {
                pages.push(PlacedPage { chapter: id, page });
                page_number += 1;
            }
            debug!(
                "chapter {} ({:?}) starts on page {:?}",
                id.0,
                chapter.title,
                start_pages.get(id)
            );
        }

        info!(
            "paginated {} chapters into {} pages",
            project.chapters.len(),
            pages.len()
        );
        Ok(Pagination {
            pages,
            start_pages,
            page_offset,
        })
    }

    /// Paginate and render, regenerating the table of contents if present
    pub fn generate(&self, project: &Project) -> Result<RenderedBook, LayoutError> {
        let Some(toc_id) = project.table_of_contents() else {
            let pagination = self.paginate(project)?;
            return Ok(self.render(project, pagination, None));
        };

        let mut working = project.clone();
        working.chapters[toc_id.0].content = TOC_PLACEHOLDER.to_string();
        let first = self.paginate(&working)?;

        let toc = table_of_contents(
            &working,
            &first.start_pages,
            first.page_offset,
            self.theme.show_subtitles_in_toc,
        );
        working.chapters[toc_id.0].content = toc.clone();
        let second = self.paginate(&working)?;

        // Known limitation: a table of contents longer than the placeholder
        // shifts later chapters, and the entries are not regenerated
        for (id, chapter) in working.chapters() {
            if id == toc_id {
                continue;
            }
            let before = first.start_pages.get(id);
            let after = second.start_pages.get(id);
            if before != after {
                warn!(
                    "chapter {:?} moved from page {:?} to {:?}; table of contents is stale",
                    chapter.title, before, after
                );
            }
        }

        Ok(self.render(&working, second, Some(toc)))
    }

    fn render(
        &self,
        project: &Project,
        pagination: Pagination,
        table_of_contents: Option<String>,
    ) -> RenderedBook {
        let renderer = PageRenderer::new(&self.theme, &self.measure, project);
        let pages = pagination
            .pages
            .iter()
            .enumerate()
            .map(|(index, placed)| {
                let chapter = &project.chapters[placed.chapter.0];
                renderer.render(index, chapter, placed, pagination.page_offset)
            })
            .collect();

        RenderedBook {
            pages,
            start_pages: pagination.start_pages,
            page_offset: pagination.page_offset,
            table_of_contents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChapterFlags;

    fn chapter(title: &str, paragraphs: usize) -> Chapter {
        let body: Vec<String> = (0..paragraphs)
            .map(|i| format!("Paragraph {} of {}, with enough words to wrap over a couple of lines in the column.", i + 1, title))
            .collect();
        Chapter::new(title, body.join("\n\n"))
    }

    fn book() -> Project {
        let toc = ChapterFlags {
            is_table_of_contents: true,
            ..ChapterFlags::default()
        };
        Project {
            book_title: "Test Book".to_string(),
            chapters: vec![
                Chapter::new("Contents", "").with_flags(toc),
                chapter("One", 30),
                chapter("Two", 5),
                chapter("Three", 60),
            ],
            ..Project::default()
        }
    }

    #[test]
    fn test_chapters_start_on_new_pages() {
        let engine = LayoutEngine::new(Theme::default());
        let project = Project {
            chapters: vec![chapter("A", 1), chapter("B", 1)],
            ..Project::default()
        };
        let pagination = engine.paginate(&project).unwrap();
        assert_eq!(pagination.pages.len(), 2);
        assert_eq!(pagination.start_pages.get(ChapterId(0)), Some(1));
        assert_eq!(pagination.start_pages.get(ChapterId(1)), Some(2));
        assert_eq!(pagination.page_offset, 0);
    }

    #[test]
    fn test_observer_called_once_per_chapter() {
        #[derive(Default)]
        struct Counter(Vec<(ChapterId, u32)>);
        impl PageObserver for Counter {
            fn on_first_page(&mut self, chapter: ChapterId, page_number: u32) {
                self.0.push((chapter, page_number));
            }
        }

        let theme = Theme::default();
        let measure = MetricsMeasure::default();
        let long = chapter("Long", 40);
        let mut paginator = ChapterPaginator::new(ChapterId(4), &long, &theme, &measure);
        let mut counter = Counter::default();
        let mut page_number = 10;
        while paginator.next_page(page_number, &mut counter).unwrap().is_some() {
            page_number += 1;
        }
        assert!(page_number > 12);
        assert_eq!(counter.0, vec![(ChapterId(4), 10)]);
        assert!(paginator.is_finished());
    }

    #[test]
    fn test_excluded_front_matter_offsets_numbers() {
        let front = ChapterFlags {
            exclude_from_page_count: true,
            ..ChapterFlags::default()
        };
        let project = Project {
            chapters: vec![
                Chapter::new("Title Page", "").with_flags(front),
                Chapter::new("Copyright", "All rights reserved.").with_flags(front),
                chapter("One", 3),
            ],
            ..Project::default()
        };
        let pagination = LayoutEngine::new(Theme::default()).paginate(&project).unwrap();
        assert_eq!(pagination.page_offset, -2);
        assert!(!pagination.pages[0].page.show_page_numbers);
        assert!(pagination.pages[2].page.show_page_numbers);
    }

    #[test]
    fn test_toc_two_pass_is_stable() {
        let engine = LayoutEngine::new(Theme::default());
        let project = book();

        let mut first_pass = project.clone();
        first_pass.chapters[0].content = TOC_PLACEHOLDER.to_string();
        let first = engine.paginate(&first_pass).unwrap();

        let rendered = engine.generate(&project).unwrap();
        for id in 1..4 {
            assert_eq!(
                rendered.chapter_start_pages().get(ChapterId(id)),
                first.start_pages.get(ChapterId(id)),
                "chapter {}",
                id
            );
        }

        let toc = rendered.table_of_contents().unwrap();
        let lines: Vec<&str> = toc.split("\n\n").collect();
        assert_eq!(lines.len(), 3);
        let one = first.start_pages.get(ChapterId(1)).unwrap();
        assert_eq!(lines[0], format!("1. One|||{}", one));
    }

    #[test]
    fn test_page_out_of_range_is_reported() {
        let engine = LayoutEngine::new(Theme::default());
        let project = Project {
            chapters: vec![chapter("Only", 1)],
            ..Project::default()
        };
        let book = engine.generate(&project).unwrap();
        assert_eq!(book.page_count(), 1);
        assert!(book.page(0).is_ok());
        assert!(matches!(
            book.page(5),
            Err(LayoutError::PageOutOfRange { index: 5, count: 1 })
        ));
    }

    #[test]
    fn test_empty_project_has_no_pages() {
        let book = LayoutEngine::new(Theme::default())
            .generate(&Project::default())
            .unwrap();
        assert_eq!(book.page_count(), 0);
        assert!(book.chapter_start_pages().is_empty());
    }

    #[test]
    fn test_measurement_failure_surfaces() {
        let theme = Theme {
            outside_margin: 4.0,
            inside_margin: 4.0,
            ..Theme::default()
        };
        let result = LayoutEngine::new(theme).paginate(&Project {
            chapters: vec![chapter("Too narrow", 1)],
            ..Project::default()
        });
        assert!(matches!(result, Err(LayoutError::Measure(_))));
    }
}
