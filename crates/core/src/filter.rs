//! Section allow-list.

use std::collections::HashSet;

use crate::article::Article;

/// Sections kept when no allow-list is configured.
pub const DEFAULT_ALLOWED_SECTIONS: &[&str] = &[
    "leaders",
    "letters",
    "briefing",
    "by invitation",
    "united states",
    "the americas",
    "asia",
    "china",
    "middle east & africa",
    "europe",
    "britain",
    "international",
    "business",
    "finance & economics",
    "science & technology",
    "culture",
    "graphic detail",
    "the world this week",
];

/// Set of section names an article must belong to in order to be kept.
///
/// Names are compared trimmed and lower-cased. [`AllowSet::allow_all`] keeps
/// every section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowSet {
    names: HashSet<String>,
    all: bool,
}

impl AllowSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| normalize(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self { names, all: false }
    }

    /// An allow-set that admits every section.
    pub fn allow_all() -> Self {
        Self { names: HashSet::new(), all: true }
    }

    pub fn contains(&self, section: &str) -> bool {
        self.all || self.names.contains(&normalize(section))
    }

    pub fn is_allow_all(&self) -> bool {
        self.all
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.names.is_empty()
    }

    /// Configured names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Keep the articles whose section is allowed, preserving order.
    pub fn retain(&self, articles: Vec<Article>) -> (Vec<Article>, usize) {
        let before = articles.len();
        let kept: Vec<Article> = articles
            .into_iter()
            .filter(|article| {
                let keep = self.contains(&article.section);
                if !keep {
                    tracing::debug!(title = %article.title, section = %article.section, "section not allowed");
                }
                keep
            })
            .collect();
        let filtered = before - kept.len();
        (kept, filtered)
    }
}

impl Default for AllowSet {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_SECTIONS)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn article(title: &str, section: &str) -> Article {
        Article::new(title, section, "", PathBuf::from("a.xhtml"))
    }

    #[test]
    fn test_membership_is_normalized() {
        let allow = AllowSet::new(["Leaders", " Finance & Economics "]);

        assert!(allow.contains("leaders"));
        assert!(allow.contains("  LEADERS "));
        assert!(allow.contains("finance & economics"));
        assert!(!allow.contains("Obituary"));
        assert_eq!(allow.len(), 2);
    }

    #[test]
    fn test_default_excludes_obituary() {
        let allow = AllowSet::default();

        assert!(allow.contains("Britain"));
        assert!(allow.contains("The world this week"));
        assert!(!allow.contains("Obituary"));
        assert!(!allow.contains("Unknown"));
    }

    #[test]
    fn test_allow_all() {
        let allow = AllowSet::allow_all();
        assert!(allow.contains("Obituary"));
        assert!(allow.contains(""));
        assert!(allow.is_allow_all());
        assert!(!allow.is_empty());
    }

    #[test]
    fn test_empty_names_are_ignored() {
        let allow = AllowSet::new(["", "   "]);
        assert!(allow.is_empty());
        assert!(!allow.contains(""));
    }

    #[test]
    fn test_retain_preserves_order() {
        let allow = AllowSet::new(["business", "britain"]);
        let articles = vec![
            article("One", "Business"),
            article("Two", "Obituary"),
            article("Three", "BRITAIN"),
            article("Four", "Business"),
        ];

        let (kept, filtered) = allow.retain(articles);
        let titles: Vec<_> = kept.iter().map(|a| a.title.as_str()).collect();

        assert_eq!(titles, vec!["One", "Three", "Four"]);
        assert_eq!(filtered, 1);
    }

    #[test]
    fn test_names_sorted() {
        let allow = AllowSet::new(["europe", "asia"]);
        assert_eq!(allow.names(), vec!["asia", "europe"]);
    }
}
