//! Image reference rewriting and asset discovery.
//!
//! Content documents point at images from different depths
//! (`photo.jpg`, `images/photo.jpg`, `../../static_images/photo.jpg`). The
//! output keeps every image in one flat directory, so each reference is
//! reduced to its filename under a single canonical prefix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use walkdir::WalkDir;

/// Image extensions recognized in references and on disk (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "avif"];

/// Canonical prefix from `articles/<slug>.html` to the flat image directory.
pub const DEFAULT_ASSET_PREFIX: &str = "../images";

static IMAGE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\s(?:src|href|xlink:href|poster)\s*=\s*)(["'])([^"'<>]*?/)?([^/"'<>]+\.(?:jpe?g|png|gif|svg|webp|bmp|avif))(["'])"#,
    )
    .expect("valid image reference regex")
});

/// Result of rewriting one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewrittenBody {
    pub html: String,
    /// Bare filenames referenced, percent-decoded to their on-disk names, in
    /// first-seen order, without duplicates.
    pub images: Vec<String>,
}

/// Rewrite image references in `html` to `<prefix>/<filename>`.
///
/// Absolute URLs (`http:`, `https:`, `data:`) and non-image references are
/// left untouched.
pub fn rewrite_asset_refs(html: &str, prefix: &str) -> RewrittenBody {
    let prefix = prefix.trim_end_matches('/');
    let mut images: Vec<String> = Vec::new();

    let rewritten = IMAGE_REF_RE.replace_all(html, |caps: &Captures| {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        if caps.get(2).map(|m| m.as_str()) != caps.get(5).map(|m| m.as_str()) {
            return whole.to_string();
        }

        let dir = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        if is_external(dir) {
            return whole.to_string();
        }

        let filename = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
        let on_disk = percent_decode_str(filename).decode_utf8_lossy();
        if !images.iter().any(|seen| *seen == on_disk) {
            images.push(on_disk.into_owned());
        }

        let quote = &caps[2];
        let target = if prefix.is_empty() { filename.to_string() } else { format!("{}/{}", prefix, filename) };
        format!("{}{}{}{}", &caps[1], quote, target, quote)
    });

    RewrittenBody { html: rewritten.into_owned(), images }
}

fn is_external(dir: &str) -> bool {
    let lower = dir.to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("data:") || lower.starts_with("//")
}

/// Whether `path` has one of the recognized image extensions.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Find every image file under `root`, keyed by bare filename.
///
/// The flat output directory cannot hold two files with the same name; the
/// first one found in path order wins and later ones are logged.
pub fn collect_images(root: &Path) -> HashMap<String, PathBuf> {
    let mut images: HashMap<String, PathBuf> = HashMap::new();

    let entries = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_image_file(entry.path()));

    for entry in entries {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(existing) = images.get(&name) {
            tracing::debug!(kept = %existing.display(), skipped = %entry.path().display(), "duplicate image name");
            continue;
        }
        images.insert(name, entry.into_path());
    }

    images
}
