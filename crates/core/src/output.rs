//! Site writer.
//!
//! Lays out a processed issue on disk:
//!
//! ```text
//! <out>/
//!   index.html
//!   feed.xml
//!   articles.json
//!   articles/<slug>.html
//!   images/<filename>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::assets::collect_images;
use crate::formatters::{JsonConfig, convert_to_json};
use crate::pipeline::{ARTICLES_DIR, IssueOutput};
use crate::render::{SiteOptions, render_article, render_index};

/// Directory, relative to the site root, that images are copied to.
pub const IMAGES_DIR: &str = "images";

/// File names of the site-level outputs.
pub const INDEX_FILE: &str = "index.html";
pub const FEED_FILE: &str = "feed.xml";
pub const MANIFEST_FILE: &str = "articles.json";

/// What [`write_site`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    /// Article pages written.
    pub pages: usize,
    /// Image files copied into the flat image directory.
    pub images_copied: usize,
    /// Referenced images with no matching file in the archive.
    pub missing_images: Vec<String>,
    /// Every file written, relative to the output directory.
    pub files: Vec<PathBuf>,
}

/// Write the processed issue found under `root` to `out`.
///
/// All images found in the archive are copied, since the flat directory is
/// shared by every page.
pub fn write_site(root: &Path, out: &Path, issue: &IssueOutput, site: &SiteOptions) -> Result<SiteReport> {
    let mut report = SiteReport::default();

    fs::create_dir_all(out.join(ARTICLES_DIR))?;
    fs::create_dir_all(out.join(IMAGES_DIR))?;

    for article in &issue.articles {
        let relative = PathBuf::from(&article.output_path);
        fs::write(out.join(&relative), render_article(article, site))?;
        report.files.push(relative);
        report.pages += 1;
    }

    let available = collect_images(root);
    let mut names: Vec<&String> = available.keys().collect();
    names.sort();
    for name in names {
        let relative = Path::new(IMAGES_DIR).join(name);
        fs::copy(&available[name], out.join(&relative))?;
        report.files.push(relative);
        report.images_copied += 1;
    }

    for name in &issue.images {
        if !available.contains_key(name) {
            tracing::warn!(image = %name, "referenced image not found in archive");
            report.missing_images.push(name.clone());
        }
    }

    fs::write(out.join(INDEX_FILE), render_index(&issue.articles, site))?;
    report.files.push(PathBuf::from(INDEX_FILE));

    #[cfg(feature = "feed")]
    {
        let feed = crate::render::render_feed(&issue.articles, site, time::OffsetDateTime::now_utc())?;
        fs::write(out.join(FEED_FILE), feed)?;
        report.files.push(PathBuf::from(FEED_FILE));
    }

    let manifest_config = JsonConfig { include_body: false, include_stats: true, pretty: true };
    let manifest = convert_to_json(&site.title, &issue.articles, Some(&issue.stats), &manifest_config)?;
    fs::write(out.join(MANIFEST_FILE), manifest)?;
    report.files.push(PathBuf::from(MANIFEST_FILE));

    tracing::info!(
        out = %out.display(),
        pages = report.pages,
        images = report.images_copied,
        "site written"
    );

    Ok(report)
}
