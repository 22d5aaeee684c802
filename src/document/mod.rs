//! Book content model: projects, chapters and their paragraphs

pub mod markdown;
mod paragraph;

pub use markdown::{parse_inlines, strip, StrippedText, StyledRun};
pub use paragraph::{segment, Paragraphs};

use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Position of a chapter within its project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct ChapterId(pub usize);

/// Per-chapter switches that change indentation, drop caps and numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChapterFlags {
    /// Body holds generated table-of-contents lines
    pub is_table_of_contents: bool,
    /// Suppress first-line indents
    pub no_indent: bool,
    /// Front matter: no page numbers, no drop caps
    pub exclude_from_page_count: bool,
}

impl ChapterFlags {
    /// Whether body paragraphs may carry a first-line indent
    pub fn allows_indent(&self) -> bool {
        !(self.is_table_of_contents || self.no_indent)
    }

    /// Whether the opening paragraph may get a drop cap or small caps
    pub fn allows_ornaments(&self) -> bool {
        !(self.is_table_of_contents || self.exclude_from_page_count)
    }
}

/// A chapter of the book
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub subtitle: String,
    /// Markdown body
    pub content: String,
    #[serde(flatten)]
    pub flags: ChapterFlags,
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_flags(mut self, flags: ChapterFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Split the body into paragraphs
    pub fn paragraphs(&self) -> Paragraphs {
        segment(&self.content)
    }
}

/// Book metadata plus its ordered chapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub book_title: String,
    pub book_subtitle: String,
    pub author: String,
    pub chapters: Vec<Chapter>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            book_title: "Untitled Book".to_string(),
            book_subtitle: String::new(),
            author: "Unknown Author".to_string(),
            chapters: Vec::new(),
        }
    }
}

impl Project {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The first chapter flagged as a table of contents
    pub fn table_of_contents(&self) -> Option<ChapterId> {
        self.chapters
            .iter()
            .position(|c| c.flags.is_table_of_contents)
            .map(ChapterId)
    }

    /// Chapters with their ids, in book order
    pub fn chapters(&self) -> impl Iterator<Item = (ChapterId, &Chapter)> + '_ {
        self.chapters.iter().enumerate().map(|(i, c)| (ChapterId(i), c))
    }

    /// Number of excluded chapters before the first numbered one
    pub fn leading_excluded_chapters(&self) -> usize {
        self.chapters
            .iter()
            .take_while(|c| c.flags.exclude_from_page_count)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let toc = ChapterFlags {
            is_table_of_contents: true,
            ..ChapterFlags::default()
        };
        assert!(!toc.allows_indent());
        assert!(!toc.allows_ornaments());

        let front = ChapterFlags {
            exclude_from_page_count: true,
            ..ChapterFlags::default()
        };
        assert!(front.allows_indent());
        assert!(!front.allows_ornaments());
    }

    #[test]
    fn test_project_from_json() {
        let project = Project::from_json(
            r#"{
                "bookTitle": "Night Train",
                "chapters": [
                    {"title": "Preface", "content": "Hi.", "excludeFromPageCount": true},
                    {"title": "Contents", "isTableOfContents": true},
                    {"title": "One", "subtitle": "Departure", "content": "It began."}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(project.book_title, "Night Train");
        assert_eq!(project.author, "Unknown Author");
        assert_eq!(project.chapters.len(), 3);
        assert_eq!(project.table_of_contents(), Some(ChapterId(1)));
        assert_eq!(project.leading_excluded_chapters(), 1);
        assert_eq!(project.chapters[2].subtitle, "Departure");
    }
}
