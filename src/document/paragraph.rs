//! Splitting chapter bodies into paragraphs

use regex::Regex;
use std::ops::Index;
use std::sync::LazyLock;

/// Blank line, tolerating CRLF and whitespace-only lines
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n\s*\r?\n").expect("paragraph break pattern is valid"));

/// Ordered, never-empty list of trimmed paragraphs
///
/// Only the placeholder for an empty body is an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraphs(Vec<String>);

impl Paragraphs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl Index<usize> for Paragraphs {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.0[index]
    }
}

fn non_empty_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split markdown on blank lines, falling back to single newlines
pub fn segment(markdown: &str) -> Paragraphs {
    if markdown.trim().is_empty() {
        return Paragraphs(vec![String::new()]);
    }

    let mut paragraphs = non_empty_trimmed(PARAGRAPH_BREAK.split(markdown));

    if paragraphs.len() <= 1 && markdown.contains('\n') {
        paragraphs = non_empty_trimmed(markdown.split('\n'));
    }

    if paragraphs.is_empty() {
        paragraphs.push(markdown.trim().to_string());
    }

    Paragraphs(paragraphs)
}
