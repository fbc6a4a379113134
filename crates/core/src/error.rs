//! Error types for Folio operations.
//!
//! This module defines the main error type [`FolioError`] which represents
//! every failure that can abort or skip work while turning a packaged issue
//! into articles.
//!
//! Only a few variants abort a run: a missing package file, an empty reading
//! order, and a run that produced no surviving articles. Everything else is
//! raised per document and the pipeline logs it and moves on.
//!
//! # Example
//!
//! ```rust
//! use folio_core::{FolioError, Result};
//!
//! fn first_document(order: &[String]) -> Result<&String> {
//!     order.first().ok_or_else(|| FolioError::EmptyReadingOrder("content.opf".into()))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for issue processing.
#[derive(Error, Debug)]
pub enum FolioError {
    /// No package-description (`.opf`) file below the archive root.
    ///
    /// Fatal: without a package there is no reading order.
    #[error("No package file found under {0}")]
    PackageNotFound(PathBuf),

    /// The package could not be parsed or declared an empty spine.
    ///
    /// Fatal: nothing downstream can run.
    #[error("Package {0} yields an empty reading order")]
    EmptyReadingOrder(PathBuf),

    /// Malformed package XML.
    #[error("Failed to parse package: {0}")]
    PackageParseError(String),

    /// HTML parsing errors, including invalid CSS selectors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A content document that contributes nothing.
    ///
    /// Raised per document; the pipeline skips it.
    #[error("Document {0} has no extractable body")]
    NoBody(PathBuf),

    /// Segmentation and filtering left nothing to publish.
    #[error("No articles survived segmentation and filtering")]
    NoArticles,

    /// Archive extraction errors.
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile (configuration file) errors.
    #[error("Profile error: {0}")]
    ProfileError(String),

    /// Serialization or template errors while producing output.
    #[error("Render error: {0}")]
    RenderError(String),
}

#[cfg(feature = "archive")]
impl From<zip::result::ZipError> for FolioError {
    fn from(err: zip::result::ZipError) -> Self {
        FolioError::ArchiveError(err.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::RenderError(err.to_string())
    }
}

/// Result type alias for FolioError.
pub type Result<T> = std::result::Result<T, FolioError>;
