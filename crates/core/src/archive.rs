//! EPUB archive extraction.
//!
//! The pipeline works on an extracted directory tree. This module unpacks an
//! `.epub` file into such a tree, refusing entries whose names would land
//! outside the destination.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::{FolioError, Result};

/// File extension of packaged issues.
pub const EPUB_EXTENSION: &str = "epub";

/// Whether `path` names a packaged (zipped) issue rather than a directory.
pub fn is_epub(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EPUB_EXTENSION))
}

/// Extract the archive at `path` into `dest`, returning the number of files written.
///
/// # Errors
///
/// Returns [`FolioError::FileNotFound`] if `path` does not exist and
/// [`FolioError::ArchiveError`] if it is not a readable zip archive.
pub fn extract_epub(path: &Path, dest: &Path) -> Result<usize> {
    if !path.is_file() {
        return Err(FolioError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    fs::create_dir_all(dest)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = entry.name(), "skipping archive entry outside the destination");
            continue;
        };
        let target: PathBuf = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }

    tracing::debug!(archive = %path.display(), files = written, "extracted archive");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn build_epub(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_epub() {
        let tmp = TempDir::new().unwrap();
        let epub = tmp.path().join("issue.epub");
        build_epub(
            &epub,
            &[
                ("mimetype", "application/epub+zip"),
                ("META-INF/container.xml", "<container/>"),
                ("OEBPS/text/a.xhtml", "<html/>"),
            ],
        );

        let dest = tmp.path().join("out");
        let written = extract_epub(&epub, &dest).unwrap();

        assert_eq!(written, 3);
        assert_eq!(fs::read_to_string(dest.join("OEBPS/text/a.xhtml")).unwrap(), "<html/>");
        assert!(is_epub(&epub));
        assert!(!is_epub(&dest));
    }

    #[test]
    fn test_unsafe_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let epub = tmp.path().join("evil.epub");
        build_epub(&epub, &[("../escape.txt", "x"), ("ok.txt", "y")]);

        let dest = tmp.path().join("out");
        let written = extract_epub(&epub, &dest).unwrap();

        assert_eq!(written, 1);
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_not_a_zip() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join("bogus.epub");
        fs::write(&bogus, "plain text").unwrap();

        let err = extract_epub(&bogus, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, FolioError::ArchiveError(_)));
    }

    #[test]
    fn test_missing_archive() {
        let tmp = TempDir::new().unwrap();
        let err = extract_epub(&tmp.path().join("absent.epub"), tmp.path()).unwrap_err();
        assert!(matches!(err, FolioError::FileNotFound(_)));
    }
}
