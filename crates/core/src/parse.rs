//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types the classifier
//! walks. They wrap `scraper` so the rest of the crate never touches
//! `ego_tree` node handles directly.
//!
//! # Example
//!
//! ```rust
//! use folio_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{FolioError, Result};

/// Represents a parsed content document.
///
/// # Example
///
/// ```rust
/// use folio_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.body().visible_text(), "Hello");
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML or XHTML from a string.
    ///
    /// html5ever recovers from almost anything, so an error here means the
    /// input is not markup at all (an empty or binary file).
    pub fn parse(html: &str) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(FolioError::HtmlParseError("empty document".to_string()));
        }
        if html.contains('\0') {
            return Err(FolioError::HtmlParseError("document contains NUL bytes".to_string()));
        }

        Ok(Self { html: Html::parse_document(html) })
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| FolioError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// The `<body>` element, or the document root for fragments without one.
    pub fn body(&'_ self) -> Element<'_> {
        Selector::parse("body")
            .ok()
            .and_then(|sel| self.html.select(&sel).next())
            .map(Element::new)
            .unwrap_or_else(|| Element::new(self.html.root_element()))
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Visible text: whitespace runs collapsed to one space and trimmed.
    pub fn visible_text(&self) -> String {
        collapse_whitespace(&self.element.text().collect::<String>())
    }

    /// Gets the lowercase tag name (e.g., "div", "h1").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Heading level for `h1`..`h6`, otherwise `None`.
    pub fn heading_level(&self) -> Option<u8> {
        let name = self.element.value().name();
        let mut chars = name.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('h' | 'H'), Some(d @ '1'..='6'), None) => d.to_digit(10).map(|d| d as u8),
            _ => None,
        }
    }

    /// Class tokens, lower-cased.
    pub fn classes(&self) -> Vec<String> {
        self.element.value().classes().map(str::to_lowercase).collect()
    }

    /// Element children in document order.
    pub fn children(&self) -> Vec<Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(Element::new).collect()
    }

    /// The nearest following sibling that is an element.
    pub fn next_element_sibling(&self) -> Option<Element<'a>> {
        self.element.next_siblings().find_map(ElementRef::wrap).map(Element::new)
    }

    /// Whether `other` shares this element's parent.
    pub fn is_sibling_of(&self, other: &Element<'_>) -> bool {
        match (self.element.parent(), other.element.parent()) {
            (Some(a), Some(b)) => a.id() == b.id(),
            _ => false,
        }
    }

    /// Whether any descendant element (not self) satisfies `pred`.
    pub fn has_descendant(&self, pred: impl Fn(&Element<'a>) -> bool) -> bool {
        self.element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .map(Element::new)
            .any(|el| pred(&el))
    }
}

/// Collapse whitespace runs into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
