//! Reading order recovery from the package (`.opf`) file.
//!
//! The package manifest maps document ids to archive paths and the spine
//! lists those ids in reading order. [`resolve_reading_order`] joins the two
//! into an ordered list of [`ContentDocument`]s with paths relative to the
//! archive root.
//!
//! Element names are compared by local name only, so packages written with
//! an `opf:` prefix and packages with no namespace at all parse the same way.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use walkdir::WalkDir;

use crate::{FolioError, Result};

/// Extension of the package-description file.
pub const PACKAGE_EXTENSION: &str = "opf";

/// A content document in spine order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentDocument {
    /// Manifest id.
    pub id: String,
    /// Path relative to the archive root.
    pub path: PathBuf,
    /// Declared media type.
    pub media_type: String,
}

/// A manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// Href relative to the package file, fragment removed and percent-decoded.
    pub href: String,
    pub media_type: String,
}

/// Parsed manifest and spine.
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    pub manifest: HashMap<String, ManifestItem>,
    pub spine: Vec<String>,
}

/// Locate the package file under `root`.
///
/// `META-INF/container.xml` is authoritative when it names an existing
/// rootfile. Otherwise the shallowest `.opf` wins, ties broken by path.
pub fn find_package_file(root: &Path) -> Option<PathBuf> {
    let container = root.join("META-INF").join("container.xml");
    if let Ok(xml) = fs::read_to_string(&container)
        && let Some(full_path) = parse_container(&xml)
    {
        let candidate = root.join(&full_path);
        if candidate.is_file() {
            return Some(candidate);
        }
        tracing::debug!(path = %full_path, "container rootfile missing, searching by extension");
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_package_file(entry.path()))
        .min_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.path().cmp(b.path())))
        .map(|entry| entry.into_path())
}

fn is_package_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION))
}

/// Extract the first `rootfile/@full-path` from `META-INF/container.xml`.
pub fn parse_container(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(strip_bom(xml));
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path") {
                    return Some(path);
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Parse the manifest and spine of a package document.
///
/// # Errors
///
/// Returns [`FolioError::PackageParseError`] on malformed XML.
pub fn parse_package(xml: &str) -> Result<PackageManifest> {
    let mut reader = Reader::from_str(strip_bom(xml));
    reader.config_mut().trim_text(true);

    let mut package = PackageManifest::default();
    let mut in_manifest = false;
    let mut in_spine = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"manifest" => in_manifest = true,
                b"spine" => in_spine = true,
                b"item" if in_manifest => add_manifest_item(&mut package, &e),
                b"itemref" if in_spine => add_spine_item(&mut package, &e),
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"item" if in_manifest => add_manifest_item(&mut package, &e),
                b"itemref" if in_spine => add_spine_item(&mut package, &e),
                _ => {}
            },
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"manifest" => in_manifest = false,
                b"spine" => in_spine = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(FolioError::PackageParseError(e.to_string())),
            _ => {}
        }
    }

    Ok(package)
}

fn add_manifest_item(package: &mut PackageManifest, e: &BytesStart<'_>) {
    let Some(id) = attribute(e, b"id") else {
        return;
    };
    let Some(href) = attribute(e, b"href") else {
        return;
    };
    let media_type = attribute(e, b"media-type").unwrap_or_default();
    let path = href.split('#').next().unwrap_or_default();
    let href = percent_decode_str(path).decode_utf8_lossy().into_owned();

    package.manifest.insert(id, ManifestItem { href, media_type });
}

fn add_spine_item(package: &mut PackageManifest, e: &BytesStart<'_>) {
    if let Some(idref) = attribute(e, b"idref") {
        package.spine.push(idref);
    }
}

/// Recover the ordered content documents of the archive at `root`.
///
/// Returns an empty vector when the package is missing, unparsable, or has an
/// empty spine; callers treat that as fatal. Spine ids missing from the
/// manifest and non-HTML spine items are skipped.
pub fn resolve_reading_order(root: &Path) -> Vec<ContentDocument> {
    let Some(package_path) = find_package_file(root) else {
        tracing::warn!(root = %root.display(), "no package file found");
        return Vec::new();
    };

    read_package_order(root, &package_path)
}

/// Like [`resolve_reading_order`], for a package file already located under `root`.
pub fn read_package_order(root: &Path, package_path: &Path) -> Vec<ContentDocument> {
    let xml = match fs::read_to_string(package_path) {
        Ok(xml) => xml,
        Err(e) => {
            tracing::warn!(path = %package_path.display(), error = %e, "cannot read package file");
            return Vec::new();
        }
    };

    let package = match parse_package(&xml) {
        Ok(package) => package,
        Err(e) => {
            tracing::warn!(path = %package_path.display(), error = %e, "cannot parse package file");
            return Vec::new();
        }
    };

    let package_dir = package_path
        .parent()
        .and_then(|dir| dir.strip_prefix(root).ok())
        .map(Path::to_path_buf)
        .unwrap_or_default();

    spine_documents(&package, &package_dir)
}

/// Join spine and manifest. `package_dir` is the package file's directory
/// relative to the archive root.
pub fn spine_documents(package: &PackageManifest, package_dir: &Path) -> Vec<ContentDocument> {
    let mut documents = Vec::with_capacity(package.spine.len());

    for idref in &package.spine {
        let Some(item) = package.manifest.get(idref) else {
            tracing::debug!(idref = %idref, "spine entry not in manifest, skipping");
            continue;
        };

        if !is_content_document(item) {
            tracing::debug!(idref = %idref, media_type = %item.media_type, "spine entry is not HTML, skipping");
            continue;
        }

        let Some(path) = normalize_relative(&package_dir.join(&item.href)) else {
            tracing::debug!(href = %item.href, "spine entry escapes archive root, skipping");
            continue;
        };

        documents.push(ContentDocument { id: idref.clone(), path, media_type: item.media_type.clone() });
    }

    documents
}

fn is_content_document(item: &ManifestItem) -> bool {
    match item.media_type.as_str() {
        "application/xhtml+xml" | "text/html" => true,
        "" => {
            let lower = item.href.to_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        }
        _ => false,
    }
}

/// Resolve `.` and `..` lexically; `None` if the path climbs above its start.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() { None } else { Some(parts.iter().collect()) }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if local_name(attr.key.as_ref()) != name {
            return None;
        }
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        Some(quick_xml::escape::unescape(&raw).map(|v| v.into_owned()).unwrap_or(raw))
    })
}

/// Extract local name from a namespaced XML name (e.g., "opf:item" -> "item").
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

fn strip_bom(xml: &str) -> &str {
    xml.strip_prefix('\u{feff}').unwrap_or(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PACKAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Issue</dc:title></metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="leaders" href="text/leaders.xhtml" media-type="application/xhtml+xml"/>
    <item id="business" href="text/business%20pages.xhtml" media-type="application/xhtml+xml"/>
    <item id="cover" href="images/cover.jpg" media-type="image/jpeg"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="leaders"/>
    <itemref idref="missing"/>
    <itemref idref="cover"/>
    <itemref idref="business"/>
  </spine>
</package>"#;

    #[test]
    fn test_parse_package_manifest_and_spine() {
        let package = parse_package(PACKAGE).unwrap();

        assert_eq!(package.manifest.len(), 4);
        assert_eq!(package.spine, vec!["leaders", "missing", "cover", "business"]);
        assert_eq!(package.manifest["business"].href, "text/business pages.xhtml");
    }

    #[test]
    fn test_parse_package_with_prefixed_elements() {
        let xml = r#"<opf:package xmlns:opf="http://www.idpf.org/2007/opf">
  <opf:manifest><opf:item id="a" href="a.html" media-type="text/html"/></opf:manifest>
  <opf:spine><opf:itemref idref="a"/></opf:spine>
</opf:package>"#;

        let package = parse_package(xml).unwrap();
        assert_eq!(package.spine, vec!["a"]);
        assert_eq!(package.manifest["a"].href, "a.html");
    }

    #[test]
    fn test_parse_package_malformed() {
        let result = parse_package("<package><manifest></spine></package>");
        assert!(matches!(result, Err(FolioError::PackageParseError(_))));
    }

    #[test]
    fn test_spine_documents_skip_unknown_and_non_html() {
        let package = parse_package(PACKAGE).unwrap();
        let docs = spine_documents(&package, Path::new("OEBPS"));

        let paths: Vec<_> = docs.iter().map(|d| d.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("OEBPS/text/leaders.xhtml"),
                PathBuf::from("OEBPS/text/business pages.xhtml")
            ]
        );
        assert_eq!(docs[0].id, "leaders");
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(
            normalize_relative(Path::new("OEBPS/text/../html/a.xhtml")),
            Some(PathBuf::from("OEBPS/html/a.xhtml"))
        );
        assert_eq!(normalize_relative(Path::new("../a.xhtml")), None);
        assert_eq!(normalize_relative(Path::new("./a.xhtml")), Some(PathBuf::from("a.xhtml")));
    }

    #[test]
    fn test_parse_container() {
        let xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;
        assert_eq!(parse_container(xml), Some("OEBPS/content.opf".to_string()));
    }

    #[test]
    fn test_resolve_reading_order_from_disk() {
        let tmp = TempDir::new().unwrap();
        let oebps = tmp.path().join("OEBPS");
        fs::create_dir_all(oebps.join("text")).unwrap();
        fs::write(oebps.join("content.opf"), PACKAGE).unwrap();

        let docs = resolve_reading_order(tmp.path());
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].path, PathBuf::from("OEBPS/text/leaders.xhtml"));
    }

    #[test]
    fn test_resolve_reading_order_prefers_container() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("META-INF")).unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(
            tmp.path().join("META-INF/container.xml"),
            r#"<container><rootfiles><rootfile full-path="a/b/real.opf"/></rootfiles></container>"#,
        )
        .unwrap();
        fs::write(tmp.path().join("decoy.opf"), "<package><spine/></package>").unwrap();
        fs::write(tmp.path().join("a/b/real.opf"), PACKAGE).unwrap();

        let found = find_package_file(tmp.path()).unwrap();
        assert!(found.ends_with("a/b/real.opf"));
        assert_eq!(resolve_reading_order(tmp.path())[0].path, PathBuf::from("a/b/text/leaders.xhtml"));
    }

    #[test]
    fn test_resolve_reading_order_missing_or_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(resolve_reading_order(tmp.path()).is_empty());

        fs::write(tmp.path().join("content.opf"), "<package><manifest/><spine/></package>").unwrap();
        assert!(resolve_reading_order(tmp.path()).is_empty());

        fs::write(tmp.path().join("content.opf"), "not xml <<<").unwrap();
        assert!(resolve_reading_order(tmp.path()).is_empty());
    }

    #[test]
    fn test_fragment_removed_before_decoding() {
        let xml = r#"<package><manifest>
  <item id="a" href="text/issue%2312.xhtml#start" media-type="application/xhtml+xml"/>
  <item id="b" href="text/plain.xhtml#p4" media-type="application/xhtml+xml"/>
</manifest><spine><itemref idref="a"/><itemref idref="b"/></spine></package>"#;

        let package = parse_package(xml).unwrap();
        assert_eq!(package.manifest["a"].href, "text/issue#12.xhtml");

        let docs = spine_documents(&package, Path::new(""));
        assert_eq!(docs[0].path, PathBuf::from("text/issue#12.xhtml"));
        assert_eq!(docs[1].path, PathBuf::from("text/plain.xhtml"));
    }

    #[test]
    fn test_find_package_file_prefers_shallowest() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::create_dir_all(tmp.path().join("z")).unwrap();
        fs::write(tmp.path().join("a/b/deep.opf"), PACKAGE).unwrap();
        fs::write(tmp.path().join("z/shallow.opf"), PACKAGE).unwrap();
        fs::write(tmp.path().join("z/also.OPF"), PACKAGE).unwrap();

        let found = find_package_file(tmp.path()).unwrap();
        assert!(found.ends_with("z/also.OPF"));
    }

    #[test]
    fn test_read_package_order_with_known_package() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("OEBPS")).unwrap();
        let package_path = tmp.path().join("OEBPS/content.opf");
        fs::write(&package_path, PACKAGE).unwrap();

        let docs = read_package_order(tmp.path(), &package_path);
        assert_eq!(docs, resolve_reading_order(tmp.path()));
        assert_eq!(docs[1].path, PathBuf::from("OEBPS/text/business pages.xhtml"));
    }
}
