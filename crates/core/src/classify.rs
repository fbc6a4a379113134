//! Element role classification.
//!
//! Each content document is walked in document order and every element of
//! interest is labelled with a [`Role`]. The heuristics live in [`RULES`], an
//! ordered table of predicates evaluated first-match-wins, so each rule can be
//! tested and tuned on its own.
//!
//! Body elements are positional rather than rule-based: an element is body
//! when it is a sibling of the open title, after it and before the next title
//! or section label.

use serde::Serialize;

use crate::Result;
use crate::parse::{Document, Element};
use crate::preprocess::{PreprocessConfig, preprocess_html};

/// Class tokens that mark a section banner.
pub const DEFAULT_SECTION_CLASSES: &[&str] = &["section", "department", "part", "header"];

/// Class tokens that mark a rubric (kicker, fly-title).
pub const DEFAULT_RUBRIC_CLASSES: &[&str] = &[
    "rubric",
    "kicker",
    "teaser",
    "flytitle",
    "fly-title",
    "deck",
    "subhead",
    "subheadline",
    "standfirst",
];

/// Upper bound (exclusive, in characters) for an all-caps section banner.
///
/// Calibration parameter: values of 30, 40 and 100 have all been used
/// against real issues. Override it through [`ClassifierConfig`].
pub const DEFAULT_LABEL_MAX_CHARS: usize = 40;

/// Tags a rubric may be carried on.
const RUBRIC_TAGS: &[&str] = &["p", "div", "span", "h2", "h3", "h4", "h5", "h6"];

/// Semantic role of a markup element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    SectionLabel,
    Rubric,
    Title,
    Body,
}

/// An element with its assigned role, detached from the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedElement {
    pub role: Role,
    /// Visible text, whitespace-collapsed.
    pub text: String,
    /// Outer HTML.
    pub html: String,
}

impl ClassifiedElement {
    fn from_element(role: Role, element: &Element<'_>) -> Self {
        Self { role, text: element.visible_text(), html: element.outer_html() }
    }
}

/// Classifier tuning.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Lowercase class names marking section labels
    pub section_classes: Vec<String>,
    /// Lowercase class names marking rubrics
    pub rubric_classes: Vec<String>,
    /// All-caps `h2` text shorter than this is a section label
    pub label_max_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            section_classes: DEFAULT_SECTION_CLASSES.iter().map(|s| s.to_string()).collect(),
            rubric_classes: DEFAULT_RUBRIC_CLASSES.iter().map(|s| s.to_string()).collect(),
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
        }
    }
}

impl ClassifierConfig {
    /// Lower-case and trim configured class names; drops empties and duplicates.
    pub fn normalized(mut self) -> Self {
        for list in [&mut self.section_classes, &mut self.rubric_classes] {
            let mut seen = Vec::with_capacity(list.len());
            for name in list.drain(..) {
                let name = name.trim().to_lowercase();
                if !name.is_empty() && !seen.contains(&name) {
                    seen.push(name);
                }
            }
            *list = seen;
        }
        self
    }
}

/// One entry of the prioritized rule table.
pub struct Rule {
    pub name: &'static str,
    pub role: Role,
    pub matches: fn(&Element<'_>, &ClassifierConfig) -> bool,
}

/// Rules in priority order; the first match decides the role.
pub const RULES: &[Rule] = &[
    Rule { name: "section-label", role: Role::SectionLabel, matches: is_section_label },
    Rule { name: "rubric", role: Role::Rubric, matches: is_rubric },
    Rule { name: "title", role: Role::Title, matches: is_title },
];

/// The role assigned by [`RULES`], if any rule matches.
pub fn match_role(element: &Element<'_>, config: &ClassifierConfig) -> Option<Role> {
    RULES.iter().find(|rule| (rule.matches)(element, config)).map(|rule| rule.role)
}

/// `h2` with non-empty text that is either classed as a section or short and
/// entirely upper-case.
pub fn is_section_label(element: &Element<'_>, config: &ClassifierConfig) -> bool {
    if element.heading_level() != Some(2) {
        return false;
    }

    let text = element.visible_text();
    if text.is_empty() {
        return false;
    }

    has_class_token(element, &config.section_classes)
        || (text.chars().count() < config.label_max_chars && is_upper_case(&text))
}

/// Rubric-classed block whose nearest following element sibling is a title.
pub fn is_rubric(element: &Element<'_>, config: &ClassifierConfig) -> bool {
    RUBRIC_TAGS.contains(&element.tag_name().as_str())
        && has_class_token(element, &config.rubric_classes)
        && !element.visible_text().is_empty()
        && element
            .next_element_sibling()
            .is_some_and(|next| is_title(&next, config))
}

/// `h1` with non-empty visible text.
pub fn is_title(element: &Element<'_>, _config: &ClassifierConfig) -> bool {
    element.heading_level() == Some(1) && !element.visible_text().is_empty()
}

/// Whether a whole class token is one of `names`.
fn has_class_token(element: &Element<'_>, names: &[String]) -> bool {
    element.classes().iter().any(|token| names.contains(token))
}

/// At least one letter and no lower-case letters.
fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// Classify every element of interest in `doc`, in document order.
pub fn classify_document(doc: &Document, config: &ClassifierConfig) -> Vec<ClassifiedElement> {
    let mut out = Vec::new();
    let mut open_title = None;
    walk(doc.body(), config, &mut open_title, &mut out);
    out
}

/// Preprocess, parse and classify one document's markup.
///
/// # Errors
///
/// Returns [`crate::FolioError::HtmlParseError`] when the markup cannot be parsed.
pub fn classify_html(
    html: &str, preprocess: &PreprocessConfig, config: &ClassifierConfig,
) -> Result<Vec<ClassifiedElement>> {
    let cleaned = preprocess_html(html, preprocess);
    let doc = Document::parse(&cleaned)?;
    Ok(classify_document(&doc, config))
}

fn walk<'a>(
    parent: Element<'a>, config: &ClassifierConfig, open_title: &mut Option<Element<'a>>,
    out: &mut Vec<ClassifiedElement>,
) {
    for child in parent.children() {
        if let Some(role) = match_role(&child, config) {
            match role {
                Role::Title => *open_title = Some(child),
                Role::SectionLabel => *open_title = None,
                Role::Rubric | Role::Body => {}
            }
            out.push(ClassifiedElement::from_element(role, &child));
            continue;
        }

        let in_title_span = open_title.as_ref().is_some_and(|title| child.is_sibling_of(title));
        if in_title_span && !contains_boundary(&child, config) {
            out.push(ClassifiedElement::from_element(Role::Body, &child));
            continue;
        }

        walk(child, config, open_title, out);
    }
}

/// Whether a title or section label is nested inside `element`.
fn contains_boundary(element: &Element<'_>, config: &ClassifierConfig) -> bool {
    element.has_descendant(|el| is_title(el, config) || is_section_label(el, config))
}

/// Roles of a classified stream, for diagnostics and tests.
pub fn roles(elements: &[ClassifiedElement]) -> Vec<Role> {
    elements.iter().map(|el| el.role).collect()
}
