pub mod article;
pub mod assets;
pub mod classify;
pub mod error;
pub mod filter;
pub mod formatters;
pub mod header;
pub mod output;
pub mod package;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod profile;
pub mod render;
pub mod segment;
pub mod slug;

#[cfg(feature = "archive")]
pub mod archive;

pub use article::Article;
#[cfg(feature = "archive")]
pub use archive::{extract_epub, is_epub};
pub use assets::{RewrittenBody, collect_images, rewrite_asset_refs};
pub use classify::{ClassifiedElement, ClassifierConfig, Role, classify_document, classify_html};
pub use error::{FolioError, Result};
pub use filter::{AllowSet, DEFAULT_ALLOWED_SECTIONS};
pub use formatters::{JsonConfig, JsonFormatter, convert_to_json};
pub use header::compose_header;
pub use output::{SiteReport, write_site};
pub use package::{ContentDocument, find_package_file, parse_package, read_package_order, resolve_reading_order};
pub use parse::Document;
pub use pipeline::{IssueOutput, PipelineConfig, PipelineConfigBuilder, RunStats, process_issue};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use profile::{Directive, Profile, ProfileLoader, ProfileLoaderBuilder, ProfileParser};
pub use render::{SiteOptions, render_article, render_index};
#[cfg(feature = "feed")]
pub use render::render_feed;
pub use segment::{SectionState, Segmenter, segment};
pub use slug::{SlugRegistry, slugify};
