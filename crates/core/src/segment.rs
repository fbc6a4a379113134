//! Article segmentation.
//!
//! The segmenter consumes classified elements document by document and groups
//! them into [`Article`]s. Its only cross-document state is the active
//! section, held in a [`SectionState`] that is passed in and handed back
//! explicitly so segmentation stays a pure function of
//! `(documents, initial state) -> (articles, final state)`.

use std::path::{Path, PathBuf};

use crate::article::Article;
use crate::classify::{ClassifiedElement, Role};

/// Section assigned to titles seen before any section label.
pub const UNKNOWN_SECTION: &str = "Unknown";

/// Minimum body length (characters of text) for an article to be kept.
pub const DEFAULT_MIN_BODY_CHARS: usize = 100;

/// The currently active section, carried across document boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionState {
    current: String,
}

impl SectionState {
    pub fn new(section: &str) -> Self {
        Self { current: section.trim().to_string() }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    fn enter(&mut self, label: &str) {
        let label = label.trim();
        if !label.is_empty() {
            self.current = label.to_string();
        }
    }
}

impl Default for SectionState {
    fn default() -> Self {
        Self::new(UNKNOWN_SECTION)
    }
}

/// What one document contributed.
#[derive(Debug, Clone, Default)]
pub struct DocumentOutcome {
    pub articles: Vec<Article>,
    /// Body elements seen; zero means the document had nothing to segment.
    pub body_elements: usize,
    /// Titles dropped for a short body.
    pub dropped: usize,
}

/// Incremental segmenter; feed documents in spine order.
#[derive(Debug, Clone)]
pub struct Segmenter {
    state: SectionState,
    min_body_chars: usize,
}

impl Segmenter {
    pub fn new(initial: SectionState, min_body_chars: usize) -> Self {
        Self { state: initial, min_body_chars }
    }

    pub fn state(&self) -> &SectionState {
        &self.state
    }

    pub fn into_state(self) -> SectionState {
        self.state
    }

    /// Segment one document's classified stream.
    ///
    /// Any article still open at the end of the document is closed here: its
    /// body can only be made of siblings of its title, which all live in this
    /// document. The section state carries over unchanged.
    pub fn feed_document(&mut self, source: &Path, elements: &[ClassifiedElement]) -> DocumentOutcome {
        let mut outcome = DocumentOutcome::default();
        let mut pending_rubric: Option<&str> = None;
        let mut open: Option<Article> = None;

        for element in elements {
            match element.role {
                Role::SectionLabel => {
                    self.close(open.take(), &mut outcome);
                    self.state.enter(&element.text);
                    pending_rubric = None;
                }
                Role::Rubric => pending_rubric = Some(&element.text),
                Role::Title => {
                    self.close(open.take(), &mut outcome);
                    if element.text.trim().is_empty() {
                        continue;
                    }
                    open = Some(Article::new(
                        &element.text,
                        self.state.current(),
                        pending_rubric.take().unwrap_or_default(),
                        source.to_path_buf(),
                    ));
                }
                Role::Body => {
                    outcome.body_elements += 1;
                    if let Some(article) = open.as_mut() {
                        article.push_body(&element.html, &element.text);
                    }
                }
            }
        }

        self.close(open, &mut outcome);
        outcome
    }

    fn close(&self, article: Option<Article>, outcome: &mut DocumentOutcome) {
        let Some(mut article) = article else {
            return;
        };

        if article.body_len() < self.min_body_chars {
            tracing::trace!(title = %article.title, chars = article.body_len(), "dropping short article");
            outcome.dropped += 1;
            return;
        }

        article.seal();
        outcome.articles.push(article);
    }
}

/// Segment a whole stream of classified documents.
pub fn segment<I>(documents: I, initial: SectionState, min_body_chars: usize) -> (Vec<Article>, SectionState)
where
    I: IntoIterator<Item = (PathBuf, Vec<ClassifiedElement>)>,
{
    let mut segmenter = Segmenter::new(initial, min_body_chars);
    let mut articles = Vec::new();

    for (source, elements) in documents {
        articles.extend(segmenter.feed_document(&source, &elements).articles);
    }

    (articles, segmenter.into_state())
}
