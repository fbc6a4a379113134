//! Slug generation and per-run uniqueness.
//!
//! Slugs are derived from titles and disambiguated deterministically: a
//! collision gets the article's ordinal appended, never a random suffix, so
//! identical input always yields identical output paths.

use std::collections::HashMap;

/// Maximum slug length in characters.
pub const DEFAULT_MAX_SLUG_LEN: usize = 50;

/// Slug used when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "article";

/// Generate a slug from text.
///
/// Punctuation is dropped, whitespace runs become a single `-`, the result
/// is lower-cased and cut to `max_len` characters without a trailing `-`.
///
/// # Examples
///
/// ```
/// use folio_core::slug::slugify;
///
/// assert_eq!(slugify("Greenback danger", 50), "greenback-danger");
/// assert_eq!(slugify("What's next? America & China", 50), "whats-next-america-china");
/// ```
pub fn slugify(text: &str, max_len: usize) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();

    let joined = kept
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    let truncated: String = joined.chars().take(max_len).collect();
    let slug = truncated.trim_end_matches(['-', '_']);

    if slug.is_empty() { FALLBACK_SLUG.to_string() } else { slug.to_string() }
}

/// Slugs issued during one run.
#[derive(Debug, Clone, Default)]
pub struct SlugRegistry {
    issued: HashMap<String, usize>,
    max_len: usize,
}

impl SlugRegistry {
    pub fn new(max_len: usize) -> Self {
        Self { issued: HashMap::new(), max_len }
    }

    /// Issue a unique slug for `title`.
    ///
    /// `ordinal` is the article's 1-based position in the output sequence.
    /// A colliding slug becomes `<slug>-<ordinal>`, then `<slug>-<ordinal>-<k>`
    /// if even that is taken.
    pub fn allocate(&mut self, title: &str, ordinal: usize) -> String {
        let base = slugify(title, self.max_len);

        let mut candidate = base.clone();
        if self.issued.contains_key(&candidate) {
            candidate = format!("{}-{}", base, ordinal);
            let mut k = 2;
            while self.issued.contains_key(&candidate) {
                candidate = format!("{}-{}-{}", base, ordinal, k);
                k += 1;
            }
        }

        *self.issued.entry(base).or_insert(0) += 1;
        self.issued.entry(candidate.clone()).or_insert(0);
        candidate
    }

    /// Whether `slug` has been issued.
    pub fn contains(&self, slug: &str) -> bool {
        self.issued.contains_key(slug)
    }

    /// How many titles produced `base` as their un-disambiguated slug.
    pub fn count(&self, base: &str) -> usize {
        self.issued.get(base).copied().unwrap_or(0)
    }
}
