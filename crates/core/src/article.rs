//! Article output type.
//!
//! This module defines the [`Article`] struct: the unit the segmenter emits,
//! which the header, asset and slug steps then enrich in place before it is
//! handed to the renderer.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Longest title kept verbatim; longer titles are cut to fit with an ellipsis.
pub const MAX_TITLE_CHARS: usize = 150;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").expect("valid word regex"));

static DATELINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(st|nd|rd|th)?,?\s+\d{4}\b",
    )
    .expect("valid dateline regex")
});

/// One article of the issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Title text, whitespace-collapsed.
    pub title: String,

    /// Section active when the title was seen.
    pub section: String,

    /// Rubric immediately preceding the title, or empty.
    pub rubric: String,

    /// Deduplicated "Section | Rubric" header.
    pub display_header: String,

    /// Body markup, one element per line.
    pub body: String,

    /// Plain text of the body.
    #[serde(skip)]
    pub text: String,

    /// Dateline found in the body text.
    pub date: Option<String>,

    /// Word count of the body text.
    pub word_count: usize,

    /// Unique identifier within the run.
    pub slug: String,

    /// Output path relative to the site root.
    pub output_path: String,

    /// Image filenames the body references, in first-seen order.
    pub images: Vec<String>,

    /// Content document the article came from, relative to the archive root.
    pub source_document: PathBuf,
}

impl Article {
    /// Opens an article with an empty body.
    pub fn new(title: &str, section: &str, rubric: &str, source_document: PathBuf) -> Self {
        Self {
            title: clean_title(title),
            section: section.trim().to_string(),
            rubric: rubric.trim().to_string(),
            display_header: String::new(),
            body: String::new(),
            text: String::new(),
            date: None,
            word_count: 0,
            slug: String::new(),
            output_path: String::new(),
            images: Vec::new(),
            source_document,
        }
    }

    /// Appends one body element.
    pub fn push_body(&mut self, html: &str, text: &str) {
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(html);

        if !text.is_empty() {
            if !self.text.is_empty() {
                self.text.push('\n');
            }
            self.text.push_str(text);
        }
    }

    /// Length of the body text in characters.
    pub fn body_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Fills the derived fields once the body is complete.
    pub fn seal(&mut self) {
        self.word_count = count_words(&self.text);
        self.date = find_dateline(&self.text);
    }
}

/// Collapse whitespace and cut overly long titles.
fn clean_title(title: &str) -> String {
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.chars().count() > MAX_TITLE_CHARS {
        let cut: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", cut.trim_end())
    } else {
        title
    }
}

/// Count words in text using a simple regex pattern
fn count_words(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// First "Month Nth YYYY" dateline in the text.
fn find_dateline(text: &str) -> Option<String> {
    DATELINE_RE.find(text).map(|m| m.as_str().to_string())
}
