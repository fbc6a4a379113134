//! Issue processing pipeline.
//!
//! This module wires the components together: the reading order is resolved
//! from the package, each content document is loaded and classified in spine
//! order, the segmenter threads the active section across documents, and the
//! resulting articles are given headers, rewritten asset references and slugs
//! before the section filter runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_core::pipeline::{PipelineConfig, process_issue};
//!
//! let config = PipelineConfig::builder().min_body_chars(200).build();
//! let issue = process_issue("issue/".as_ref(), &config)?;
//! for article in &issue.articles {
//!     println!("{} -> {}", article.display_header, article.output_path);
//! }
//! # Ok::<(), folio_core::FolioError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::article::Article;
use crate::assets::{DEFAULT_ASSET_PREFIX, rewrite_asset_refs};
use crate::classify::{ClassifiedElement, ClassifierConfig, classify_html};
use crate::filter::AllowSet;
use crate::header::compose_header;
use crate::package::{ContentDocument, find_package_file, read_package_order};
use crate::preprocess::PreprocessConfig;
use crate::segment::{DEFAULT_MIN_BODY_CHARS, SectionState, Segmenter, UNKNOWN_SECTION};
use crate::slug::{DEFAULT_MAX_SLUG_LEN, SlugRegistry};
use crate::{FolioError, Result};

/// Directory, relative to the site root, that article pages are written to.
pub const ARTICLES_DIR: &str = "articles";

/// Configuration for one processing run.
///
/// # Example
///
/// ```rust
/// use folio_core::{AllowSet, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .allow(AllowSet::allow_all())
///     .max_slug_len(40)
///     .build();
/// assert!(config.allow.contains("Obituary"));
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Role classification heuristics.
    pub classifier: ClassifierConfig,

    /// Chrome stripping applied to each document before parsing.
    pub preprocess: PreprocessConfig,

    /// Articles with less body text than this are discarded (default: 100).
    pub min_body_chars: usize,

    /// Maximum slug length in characters (default: 50).
    pub max_slug_len: usize,

    /// Prefix image references are rewritten to (default: `../images`).
    pub asset_prefix: String,

    /// Sections that survive filtering.
    pub allow: AllowSet,

    /// Section assigned before the first section label (default: `Unknown`).
    pub initial_section: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            preprocess: PreprocessConfig::default(),
            min_body_chars: DEFAULT_MIN_BODY_CHARS,
            max_slug_len: DEFAULT_MAX_SLUG_LEN,
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            allow: AllowSet::default(),
            initial_section: UNKNOWN_SECTION.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    pub fn classifier(mut self, value: ClassifierConfig) -> Self {
        self.config.classifier = value;
        self
    }

    pub fn preprocess(mut self, value: PreprocessConfig) -> Self {
        self.config.preprocess = value;
        self
    }

    pub fn label_max_chars(mut self, value: usize) -> Self {
        self.config.classifier.label_max_chars = value;
        self
    }

    pub fn min_body_chars(mut self, value: usize) -> Self {
        self.config.min_body_chars = value;
        self
    }

    pub fn max_slug_len(mut self, value: usize) -> Self {
        self.config.max_slug_len = value;
        self
    }

    pub fn asset_prefix(mut self, value: impl Into<String>) -> Self {
        self.config.asset_prefix = value.into();
        self
    }

    pub fn allow(mut self, value: AllowSet) -> Self {
        self.config.allow = value;
        self
    }

    pub fn initial_section(mut self, value: impl Into<String>) -> Self {
        self.config.initial_section = value.into();
        self
    }

    pub fn build(self) -> PipelineConfig {
        let mut config = self.config;
        config.classifier = config.classifier.normalized();
        config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Content documents in the reading order.
    pub documents: usize,
    /// Documents skipped because they could not be read or had no body.
    pub skipped_documents: usize,
    /// Titles dropped for a short body.
    pub dropped_articles: usize,
    /// Articles produced by segmentation.
    pub segmented: usize,
    /// Articles removed by the section filter.
    pub filtered: usize,
    /// Articles kept.
    pub kept: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct IssueOutput {
    /// Surviving articles in reading order.
    pub articles: Vec<Article>,
    /// Image filenames referenced by surviving articles, first-seen order.
    pub images: Vec<String>,
    /// Section active at the end of the reading order.
    pub final_section: SectionState,
    pub stats: RunStats,
}

/// Process an extracted issue rooted at `root`.
///
/// # Errors
///
/// - [`FolioError::PackageNotFound`] when there is no package file.
/// - [`FolioError::EmptyReadingOrder`] when the package yields no documents.
/// - [`FolioError::NoArticles`] when nothing survives filtering.
///
/// Unreadable or empty documents are skipped with a warning.
pub fn process_issue(root: &Path, config: &PipelineConfig) -> Result<IssueOutput> {
    let package = find_package_file(root).ok_or_else(|| FolioError::PackageNotFound(root.to_path_buf()))?;
    let order = read_package_order(root, &package);
    if order.is_empty() {
        return Err(FolioError::EmptyReadingOrder(package));
    }

    tracing::info!(package = %package.display(), documents = order.len(), "resolved reading order");

    let mut stats = RunStats { documents: order.len(), ..Default::default() };
    let mut segmenter = Segmenter::new(SectionState::new(&config.initial_section), config.min_body_chars);
    let mut articles = Vec::new();

    for document in &order {
        let elements = match load_document(root, document, config) {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!(document = %document.path.display(), error = %e, "skipping document");
                stats.skipped_documents += 1;
                continue;
            }
        };

        let outcome = segmenter.feed_document(&document.path, &elements);
        stats.dropped_articles += outcome.dropped;
        articles.extend(outcome.articles);
    }

    stats.segmented = articles.len();
    enrich(&mut articles, config);

    let (articles, filtered) = config.allow.retain(articles);
    stats.filtered = filtered;
    stats.kept = articles.len();

    if articles.is_empty() {
        return Err(FolioError::NoArticles);
    }

    let mut images: Vec<String> = Vec::new();
    for name in articles.iter().flat_map(|a| a.images.iter()) {
        if !images.contains(name) {
            images.push(name.clone());
        }
    }

    tracing::info!(
        segmented = stats.segmented,
        kept = stats.kept,
        filtered = stats.filtered,
        skipped_documents = stats.skipped_documents,
        "issue processed"
    );

    Ok(IssueOutput { articles, images, final_section: segmenter.into_state(), stats })
}

/// Read and classify one content document.
fn load_document(root: &Path, document: &ContentDocument, config: &PipelineConfig) -> Result<Vec<ClassifiedElement>> {
    let path = root.join(&document.path);
    if !path.is_file() {
        return Err(FolioError::FileNotFound(path));
    }

    let bytes = fs::read(&path)?;
    let html = String::from_utf8_lossy(&bytes);
    let elements = classify_html(&html, &config.preprocess, &config.classifier)?;

    if elements.is_empty() {
        return Err(FolioError::NoBody(document.path.clone()));
    }

    Ok(elements)
}

/// Header, asset and slug steps, in emission order.
///
/// Slugs are allocated before filtering so an article keeps the same path
/// whichever sections are allowed.
fn enrich(articles: &mut [Article], config: &PipelineConfig) {
    let mut slugs = SlugRegistry::new(config.max_slug_len);

    for (index, article) in articles.iter_mut().enumerate() {
        article.display_header = compose_header(&article.section, &article.rubric);

        let rewritten = rewrite_asset_refs(&article.body, &config.asset_prefix);
        article.body = rewritten.html;
        article.images = rewritten.images;

        article.slug = slugs.allocate(&article.title, index + 1);
        article.output_path = format!("{}/{}.html", ARTICLES_DIR, article.slug);
    }
}
